use crate::{
    add_native_word,
    runtime::{
        data_structures::value::Value,
        error::{self, error_at, script_error},
        interpreter::Interpreter,
    },
};
use libloading::Library;
use std::{
    collections::HashMap,
    ffi::c_void,
    fmt::{self, Debug, Formatter},
    rc::Rc,
};
use tracing::debug;

/// A function supplied by the embedding program.  It's handed the call's arguments in the order
/// they were pushed.
pub type HostFunction = dyn Fn(&[Value]) -> error::Result<Value>;

/// Native functions are called with every argument and the result in one of these types.
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum NativeType {
    Int,
    Float,
}

impl NativeType {
    fn from_name(name: &str) -> Option<NativeType> {
        match name {
            "i64" => Some(NativeType::Int),
            "f64" => Some(NativeType::Float),
            _ => None,
        }
    }
}

/// How a foreign function is reached.
enum Callee {
    /// A closure registered by the embedding program.
    Host(Rc<HostFunction>),

    /// A symbol in a loaded shared library.
    Native {
        library: Rc<Library>,
        value_type: NativeType,
    },
}

/// A callable handle that scripts can keep on the stack and hand to `ffi::call`.
pub struct ForeignFunction {
    name: String,
    callee: Callee,
}

pub type ForeignFunctionPtr = Rc<ForeignFunction>;

/// The most arguments a native function can be called with.
const MAX_NATIVE_ARITY: usize = 4;

/// Look up a symbol as a function of the given arity and call it.  The symbol is resolved again on
/// each call so that no raw pointer outlives the library handle.
///
/// # Safety
///
/// The symbol must really be a C function taking `args.len()` arguments of type `T` and returning
/// a `T`.
unsafe fn call_symbol<T: Copy>(
    library: &Library,
    symbol: &[u8],
    args: &[T],
) -> Result<Option<T>, libloading::Error> {
    let result = match *args {
        [] => (library.get::<unsafe extern "C" fn() -> T>(symbol)?)(),
        [a] => (library.get::<unsafe extern "C" fn(T) -> T>(symbol)?)(a),
        [a, b] => (library.get::<unsafe extern "C" fn(T, T) -> T>(symbol)?)(a, b),
        [a, b, c] => (library.get::<unsafe extern "C" fn(T, T, T) -> T>(symbol)?)(a, b, c),
        [a, b, c, d] => (library.get::<unsafe extern "C" fn(T, T, T, T) -> T>(symbol)?)(a, b, c, d),
        _ => return Ok(None),
    };

    Ok(Some(result))
}

impl ForeignFunction {
    pub fn name(&self) -> &String {
        &self.name
    }

    pub fn is_host(&self) -> bool {
        matches!(self.callee, Callee::Host(_))
    }

    /// Call the function with arguments in push order.
    pub fn call(&self, interpreter: &dyn Interpreter, args: &[Value]) -> error::Result<Value> {
        match &self.callee {
            Callee::Host(function) => match function(args) {
                Ok(value) => Ok(value),

                // Give errors raised by the host the location of the call.
                Err(error) if error.location().is_none() => {
                    error_at(interpreter, error.kind().clone())
                }

                Err(error) => Err(error),
            },

            Callee::Native {
                library,
                value_type,
            } => {
                if args.len() > MAX_NATIVE_ARITY {
                    return script_error(
                        interpreter,
                        format!(
                            "Native function {} called with {} arguments, at most {} are supported.",
                            self.name,
                            args.len(),
                            MAX_NATIVE_ARITY
                        ),
                    );
                }

                if let Some(arg) = args.iter().find(|arg| !arg.is_numeric()) {
                    return script_error(
                        interpreter,
                        format!(
                            "Native function {} expects numbers, found {}.",
                            self.name,
                            arg.repr()
                        ),
                    );
                }

                let symbol = self.name.as_bytes();

                let result = match value_type {
                    NativeType::Int => {
                        let args: Vec<i64> = args.iter().map(Value::get_int_val).collect();
                        unsafe { call_symbol(library, symbol, &args) }.map(|r| r.map(Value::Int))
                    }

                    NativeType::Float => {
                        let args: Vec<f64> = args.iter().map(Value::get_float_val).collect();
                        unsafe { call_symbol(library, symbol, &args) }.map(|r| r.map(Value::Float))
                    }
                };

                match result {
                    Ok(Some(value)) => Ok(value),
                    Ok(None) => script_error(
                        interpreter,
                        format!("Unsupported arity for native function {}.", self.name),
                    ),
                    Err(error) => script_error(
                        interpreter,
                        format!("Could not call native function {}: {}", self.name, error),
                    ),
                }
            }
        }
    }
}

impl Debug for ForeignFunction {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        let kind = if self.is_host() { "host" } else { "native" };
        write!(f, "<{} function {}>", kind, self.name)
    }
}

/// The loaded libraries and host functions of an interpreter session.
pub struct FfiInterface {
    libs: HashMap<String, Rc<Library>>,
    host_functions: HashMap<String, Rc<HostFunction>>,
}

impl Default for FfiInterface {
    fn default() -> Self {
        Self::new()
    }
}

impl FfiInterface {
    pub fn new() -> FfiInterface {
        FfiInterface {
            libs: HashMap::new(),
            host_functions: HashMap::new(),
        }
    }

    /// Make a closure callable from script under the given name, replacing any previous one.
    pub fn register_host_function(&mut self, name: &str, function: Rc<HostFunction>) {
        debug!(name, "registering host function");
        let _ = self.host_functions.insert(name.to_string(), function);
    }

    pub fn host_function(&self, name: &str) -> Option<&Rc<HostFunction>> {
        self.host_functions.get(name)
    }

    pub fn library(&self, alias: &str) -> Option<&Rc<Library>> {
        self.libs.get(alias)
    }

    pub fn has_library(&self, alias: &str) -> bool {
        self.libs.contains_key(alias)
    }

    fn add_library(&mut self, alias: String, library: Library) {
        let _ = self.libs.insert(alias, Rc::new(library));
    }
}

/// Load a shared library and register it under an alias.
///
/// Signature: `path alias -- `
fn word_ffi_open(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    interpreter.require_depth(2)?;

    let alias = interpreter.pop_as_string()?;
    let path = interpreter.pop_as_string()?;

    if interpreter.ffi().has_library(&alias) {
        return script_error(interpreter, format!("Library {} is already loaded.", alias));
    }

    match unsafe { Library::new(&path) } {
        Ok(library) => {
            debug!(%path, %alias, "loaded library");
            interpreter.ffi_mut().add_library(alias, library);
            Ok(())
        }

        Err(error) => script_error(
            interpreter,
            format!("Could not load library {}: {}", path, error),
        ),
    }
}

/// Bind a function from a loaded library.  The type, i64 or f64, applies to every argument and the
/// result.
///
/// Signature: `alias name type -- function`
fn word_ffi_fn(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    interpreter.require_depth(3)?;

    let type_name = interpreter.pop_as_string()?;
    let name = interpreter.pop_as_string()?;
    let alias = interpreter.pop_as_string()?;

    let value_type = match NativeType::from_name(&type_name) {
        Some(value_type) => value_type,
        None => {
            return script_error(
                interpreter,
                format!("Unknown native type {}, expected i64 or f64.", type_name),
            )
        }
    };

    let library = match interpreter.ffi().library(&alias) {
        Some(library) => library.clone(),
        None => return script_error(interpreter, format!("Library {} is not loaded.", alias)),
    };

    if let Err(error) = unsafe { library.get::<*mut c_void>(name.as_bytes()) } {
        return script_error(
            interpreter,
            format!("Could not find function {} in {}: {}", name, alias, error),
        );
    }

    let function = ForeignFunction {
        name,
        callee: Callee::Native {
            library,
            value_type,
        },
    };

    interpreter.push(Value::Foreign(Rc::new(function)));
    Ok(())
}

/// Fetch a function registered by the embedding program.
///
/// Signature: `name -- function`
fn word_ffi_host(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    let name = interpreter.pop_as_string()?;

    let function = match interpreter.ffi().host_function(&name) {
        Some(function) => function.clone(),
        None => {
            return script_error(
                interpreter,
                format!("No host function named {} is registered.", name),
            )
        }
    };

    interpreter.push(Value::Foreign(Rc::new(ForeignFunction {
        name,
        callee: Callee::Host(function),
    })));

    Ok(())
}

/// Call a foreign function with the given number of arguments from the stack.
///
/// Signature: `arg1 .. argN function count -- result`
fn word_ffi_call(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    interpreter.require_depth(2)?;

    let count = match interpreter.stack().last() {
        Some(value) if value.is_int() && value.get_int_val() >= 0 => value.get_int_val() as usize,
        Some(value) => {
            return script_error(
                interpreter,
                format!("Expected an argument count, found {}.", value.repr()),
            )
        }
        None => return error::stack_underflow(interpreter),
    };

    interpreter.require_depth(count + 2)?;

    let _ = interpreter.pop()?;
    let function = interpreter.pop_as_foreign()?;

    let first = interpreter.stack().len() - count;
    let args = interpreter.stack()[first..].to_vec();

    interpreter.truncate_stack(first);

    let result = function.call(interpreter, &args)?;
    interpreter.push(result);

    Ok(())
}

/// Register the foreign function words.
pub fn register_ffi_words(interpreter: &mut dyn Interpreter) {
    add_native_word!(
        interpreter,
        "ffi::open",
        word_ffi_open,
        "Load an external library and register it with the ffi interface.",
        "path alias -- "
    );

    add_native_word!(
        interpreter,
        "ffi::fn",
        word_ffi_fn,
        "Bind an external function, all arguments and the result share one type.",
        "alias name type -- function"
    );

    add_native_word!(
        interpreter,
        "ffi::host",
        word_ffi_host,
        "Get a function registered by the host program.",
        "name -- function"
    );

    add_native_word!(
        interpreter,
        "ffi::call",
        word_ffi_call,
        "Call a foreign function with count arguments from the stack.",
        "arg1 .. argN function count -- result"
    );
}
