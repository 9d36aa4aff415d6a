
use std::{ cmp::Ordering,
           fmt::{ self,
                   Debug,
                   Display,
                   Formatter },
           rc::Rc };
use crate::{ lang::{ code::Entry,
                     tokenizing::{ NumberType,
                                   Token } },
             runtime::{ built_ins::ffi_words::ForeignFunctionPtr,
                        error::{ self,
                                 script_error },
                        interpreter::Interpreter } };



/// Core value enumeration used by the interpreter.  This enumeration is used to represent all data
/// types that the interpreter and the scripts it runs can understand and manipulate.
#[derive(Clone)]
pub enum Value
{
    /// The value represents nothing and no data is associated.
    None,

    /// A boolean value.
    Bool(bool),

    /// We have an integer value.  Represented as an i64.
    Int(i64),

    /// A floating-point value  Represented as a f64.
    Float(f64),

    /// A string value, represented by a Rust string.
    String(String),

    /// A reference to a dictionary entry.  Pushed by `'`, and also how words are collected on the
    /// stack while a definition is being compiled.
    Word(Entry),

    /// A token that didn't resolve to a word while compiling.
    Token(Token),

    /// A callable bound through the foreign function interface.
    Foreign(ForeignFunctionPtr)
}


/// Convert an arbitrary data type to a Value.
pub trait ToValue
{
    /// Implement to handle the actual conversion.
    fn to_value(&self) -> Value;
}


/// Convert a borrowed string into a Value.
impl ToValue for &String
{
    fn to_value(&self) -> Value
    {
        let string = (*self).clone();
        Value::String(string)
    }
}


impl ToValue for &str
{
    fn to_value(&self) -> Value
    {
        Value::String(self.to_string())
    }
}


/// Allow code to create a default Value object.
impl Default for Value
{
    fn default() -> Value
    {
        Value::None
    }
}


/// Manage equality for the Value enumeration.  Numbers compare by value across their types,
/// everything else only compares equal to a value of the same type.
impl PartialEq for Value
{
    fn eq(&self, other: &Value) -> bool
    {
        if Value::both_are_none(self, other)
        {
            true
        }
        else if Value::both_are_numeric(self, other)
        {
            if Value::either_is_float(self, other)
            {
                self.get_float_val() == other.get_float_val()
            }
            else
            {
                self.get_int_val() == other.get_int_val()
            }
        }
        else
        {
            match ( self, other )
            {
                ( Value::String(a),  Value::String(b)  ) => a == b,
                ( Value::Word(a),    Value::Word(b)    ) => a.same_as(b),
                ( Value::Token(a),   Value::Token(b)   ) => a == b,
                ( Value::Foreign(a), Value::Foreign(b) ) => Rc::ptr_eq(a, b),

                _                                        => false
            }
        }
    }
}


/// Order numbers by value and strings lexically.  Other values have no ordering.
impl PartialOrd for Value
{
    fn partial_cmp(&self, other: &Value) -> Option<Ordering>
    {
        if Value::both_are_numeric(self, other)
        {
            if Value::either_is_float(self, other)
            {
                self.get_float_val().partial_cmp(&other.get_float_val())
            }
            else
            {
                Some(self.get_int_val().cmp(&other.get_int_val()))
            }
        }
        else
        {
            match ( self, other )
            {
                ( Value::String(a), Value::String(b) ) => Some(a.cmp(b)),
                _                                      => None
            }
        }
    }
}


/// Pretty print the value for display, this is what `.` shows.
impl Display for Value
{
    fn fmt(&self, f: &mut Formatter) -> fmt::Result
    {
        match self
        {
            Value::None           => write!(f, "none"),
            Value::Bool(value)    => write!(f, "{}", value),
            Value::Int(value)     => write!(f, "{}", value),
            Value::Float(value)   => write!(f, "{:?}", value),
            Value::String(value)  => write!(f, "{}", value),
            Value::Word(value)    => write!(f, "{}", value.name()),
            Value::Token(value)   => write!(f, "{}", value),
            Value::Foreign(value) => write!(f, "<foreign {}>", value.name())
        }
    }
}


/// Debug output uses the same form as `.s`.
impl Debug for Value
{
    fn fmt(&self, f: &mut Formatter) -> fmt::Result
    {
        write!(f, "{}", self.repr())
    }
}


/// Define implementations for converting between Values and the raw data types they represent.
macro_rules! value_conversion
{
    ($data_type:ty , $variant:ident , $as_ident:ident) =>
    {
        #[doc = concat!("Convert a value to ", stringify!($data_type), ".")]
        impl Value
        {
            pub fn $as_ident(&self, interpreter: &dyn Interpreter) -> error::Result<&$data_type>
            {
                match self
                {
                    Value::$variant(value) => Ok(value),
                    _ => script_error(interpreter,
                                      format!("Value {} could not be converted to {}",
                                              self.repr(),
                                              stringify!($data_type)))
                }
            }
        }


        #[doc = concat!("Allow conversion from ", stringify!($data_type), " to a Value.")]
        impl ToValue for $data_type
        {
            fn to_value(&self) -> Value
            {
                Value::$variant(self.clone())
            }
        }


        #[doc = concat!("Support converting from a ", stringify!($data_type), " to a Value.")]
        impl From<$data_type> for Value
        {
            fn from(original: $data_type) -> Value
            {
                original.to_value()
            }
        }
    };
}


/// Hand implement ToValue for the NumberType token enumeration.
impl ToValue for NumberType
{
    fn to_value(&self) -> Value
    {
        match self
        {
            NumberType::Int(value)   => Value::Int(*value),
            NumberType::Float(value) => Value::Float(*value)
        }
    }
}


/// Convenience implementation for converting a usize to a Value.  The usize type is not represented
/// directly in the Value enumeration, so it is converted to an i64 internally.
impl ToValue for usize
{
    fn to_value(&self) -> Value
    {
        Value::Int(*self as i64)
    }
}


// Implement the simple conversions for the value enumeration types.
value_conversion!(i64,               Int,     as_int);
value_conversion!(f64,               Float,   as_float);
value_conversion!(bool,              Bool,    as_bool);
value_conversion!(String,            String,  as_string);
value_conversion!(Entry,             Word,    as_word);
value_conversion!(Token,             Token,   as_token);
value_conversion!(ForeignFunctionPtr, Foreign, as_foreign);


/// Handily implement variant checks for the types the Value enumeration supports.
macro_rules! is_variant
{
    ($name:ident , $either_name:ident , $variant:ident) =>
    {
        #[doc = concat!("Check if the value is the variant ", stringify!($variant), ".")]
        pub fn $name(&self) -> bool
        {
            matches!(self, Value::$variant(_))
        }

        #[doc = concat!("Check if either of the two values are the variant ",
                        stringify!($variant),
                        ".")]
        pub fn $either_name(a: &Value, b: &Value) -> bool
        {
            a.$name() || b.$name()
        }
    };
}


impl Value
{
    /// Check if the value is the None variant.
    pub fn is_none(&self) -> bool
    {
        matches!(self, Value::None)
    }

    // Create variant checks for the other supported types.
    is_variant!(is_int,     either_is_int,     Int);
    is_variant!(is_float,   either_is_float,   Float);
    is_variant!(is_bool,    either_is_bool,    Bool);
    is_variant!(is_string,  either_is_string,  String);
    is_variant!(is_word,    either_is_word,    Word);
    is_variant!(is_token,   either_is_token,   Token);
    is_variant!(is_foreign, either_is_foreign, Foreign);


    /// Is the value any kind of numeric variant type?  Booleans count as 0 and 1.
    pub fn is_numeric(&self) -> bool
    {
        matches!(self, Value::Int(_) | Value::Float(_) | Value::Bool(_))
    }


    /// Are both values nothing?
    pub fn both_are_none(a: &Value, b: &Value) -> bool
    {
        a.is_none() && b.is_none()
    }


    /// Are both values numeric types?
    pub fn both_are_numeric(a: &Value, b: &Value) -> bool
    {
        a.is_numeric() && b.is_numeric()
    }


    /// Convert the Value to a boolean value, performing simple tests if it's not directly a boolean
    /// value.
    pub fn get_bool_val(&self) -> bool
    {
        match self
        {
            Value::None          => false,
            Value::Int(value)    => *value != 0,
            Value::Float(value)  => *value != 0.0,
            Value::Bool(value)   => *value,
            Value::String(value) => !value.is_empty(),
            _                    => true
        }
    }


    /// Convert the value to an integer value.  Non-numeric values convert to zero, so check with
    /// is_numeric() first.
    pub fn get_int_val(&self) -> i64
    {
        match self
        {
            Value::Int(value)   => *value,
            Value::Float(value) => *value as i64,
            Value::Bool(value)  => if *value { 1 } else { 0 },
            _                   => 0
        }
    }

    /// Convert the value to an floating point value.  Non-numeric values convert to zero, so check
    /// with is_numeric() first.
    pub fn get_float_val(&self) -> f64
    {
        match self
        {
            Value::Int(value)   => *value as f64,
            Value::Float(value) => *value,
            Value::Bool(value)  => if *value { 1.0 } else { 0.0 },
            _                   => 0.0
        }
    }


    /// The debug form of the value, as shown by `.s` and in word listings.  Strings are quoted and
    /// word references are shown with a leading tick.
    pub fn repr(&self) -> String
    {
        match self
        {
            Value::String(value) => Value::stringify(value),
            Value::Word(value)   => format!("'{}", value.name()),
            Value::Token(value)  => format!("`{}`", value.text()),
            _                    => self.to_string()
        }
    }


    /// Convert a string to a string that could be used directly within source code.  For example,
    /// new lines are converted to the \n escape sequence, etc.  The string is also enclosed in
    /// double quotes.
    pub fn stringify(text: &str) -> String
    {
        let mut result = String::new();

        result.push('"');

        for character in text.chars() {
            match character {
                '"'  => result.push_str("\\\""),
                '\n' => result.push_str("\\n"),
                '\r' => result.push_str("\\r"),
                '\t' => result.push_str("\\t"),
                '\\' => result.push_str("\\\\"),
                _    => result.push(character)
            }
        }

        result.push('"');

        result
    }
}


#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn numbers_compare_across_types()
    {
        assert_eq!(Value::Int(2), Value::Float(2.0));
        assert_eq!(Value::Bool(true), Value::Int(1));
        assert_ne!(Value::Int(2), Value::String("2".to_string()));
        assert!(Value::Int(1) < Value::Float(1.5));
        assert_eq!(Value::String("a".to_string()).partial_cmp(&Value::Int(1)), None);
    }

    #[test]
    fn truthiness()
    {
        assert!(!Value::None.get_bool_val());
        assert!(!Value::Int(0).get_bool_val());
        assert!(!Value::Float(0.0).get_bool_val());
        assert!(!Value::String(String::new()).get_bool_val());
        assert!(Value::Int(-1).get_bool_val());
        assert!(Value::String("x".to_string()).get_bool_val());
    }

    #[test]
    fn display_and_repr()
    {
        assert_eq!(Value::Float(10.0).to_string(), "10.0");
        assert_eq!(Value::Int(10).to_string(), "10");
        assert_eq!(Value::String("hi\n".to_string()).to_string(), "hi\n");
        assert_eq!(Value::String("hi\n".to_string()).repr(), "\"hi\\n\"");
        assert_eq!(Value::None.repr(), "none");
    }
}
