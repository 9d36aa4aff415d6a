use crate::{
    add_native_word,
    runtime::{
        data_structures::value::ToValue,
        error::{self, script_error},
        interpreter::Interpreter,
    },
};

/// Duplicate the top value on the data stack.
///
/// Signature: `value -- value value`
fn word_dup(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    let value = interpreter.pop()?;

    interpreter.push(value.clone());
    interpreter.push(value);

    Ok(())
}

/// Drop the top value on the data stack.
///
/// Signature: `value -- `
fn word_drop(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    let _ = interpreter.pop()?;

    Ok(())
}

/// Swap the top 2 values on the data stack.
///
/// Signature: `a b -- b a`
fn word_swap(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    interpreter.require_depth(2)?;

    let b = interpreter.pop()?;
    let a = interpreter.pop()?;

    interpreter.push(b);
    interpreter.push(a);

    Ok(())
}

/// Swap the top two pairs of values.
///
/// Signature: `a b c d -- c d a b`
fn word_2swap(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    interpreter.require_depth(4)?;

    let d = interpreter.pop()?;
    let c = interpreter.pop()?;
    let b = interpreter.pop()?;
    let a = interpreter.pop()?;

    interpreter.push(c);
    interpreter.push(d);
    interpreter.push(a);
    interpreter.push(b);

    Ok(())
}

/// Make a copy of the second value and push it on top.
///
/// Signature: `a b -- a b a`
fn word_over(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    interpreter.require_depth(2)?;

    let b = interpreter.pop()?;
    let a = interpreter.pop()?;

    interpreter.push(a.clone());
    interpreter.push(b);
    interpreter.push(a);

    Ok(())
}

/// Rotate the third value to the top of the stack.
///
/// Signature: `a b c -- b c a`
fn word_rot(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    interpreter.require_depth(3)?;

    let c = interpreter.pop()?;
    let b = interpreter.pop()?;
    let a = interpreter.pop()?;

    interpreter.push(b);
    interpreter.push(c);
    interpreter.push(a);

    Ok(())
}

/// Rotate the top value under the next two.
///
/// Signature: `a b c -- c a b`
fn word_reverse_rot(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    interpreter.require_depth(3)?;

    let c = interpreter.pop()?;
    let b = interpreter.pop()?;
    let a = interpreter.pop()?;

    interpreter.push(c);
    interpreter.push(a);
    interpreter.push(b);

    Ok(())
}

/// Drop the second value on the stack.
///
/// Signature: `a b -- b`
fn word_nip(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    interpreter.require_depth(2)?;

    let b = interpreter.pop()?;
    let _ = interpreter.pop()?;

    interpreter.push(b);

    Ok(())
}

/// Duplicate the top pair of values.
///
/// Signature: `a b -- a b a b`
fn word_2dup(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    interpreter.require_depth(2)?;

    let b = interpreter.pop()?;
    let a = interpreter.pop()?;

    interpreter.push(a.clone());
    interpreter.push(b.clone());
    interpreter.push(a);
    interpreter.push(b);

    Ok(())
}

/// Get the depth of the data stack before calling this word.
///
/// Signature: ` -- depth`
fn word_stack_depth(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    interpreter.push(interpreter.stack().len().to_value());
    Ok(())
}

/// Empty the data stack.
///
/// Signature: `... -- `
fn word_clear(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    interpreter.truncate_stack(0);
    Ok(())
}

/// Validate an index into the stack, counted from the bottom.  The stack size is the size after
/// the word's own arguments are removed.
fn check_stack_index(interpreter: &dyn Interpreter, index: i64, size: usize) -> error::Result<usize> {
    if index < 0 || index as usize >= size {
        return script_error(
            interpreter,
            format!("Index {} out of range of stack size {}.", index, size),
        );
    }

    Ok(index as usize)
}

/// Fetch a copy of the value at the given index, counted from the bottom of the stack.
///
/// Signature: `index -- value`
fn word_fetch(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    interpreter.require_depth(1)?;

    let size = interpreter.stack().len() - 1;
    let index = interpreter.stack()[size].clone();

    if !index.is_numeric() {
        return script_error(interpreter, format!("Expected an index, found {}.", index.repr()));
    }

    let index = check_stack_index(interpreter, index.get_int_val(), size)?;

    let _ = interpreter.pop()?;
    let value = interpreter.stack()[index].clone();

    interpreter.push(value);

    Ok(())
}

/// Overwrite the value at the given index, counted from the bottom of the stack.
///
/// Signature: `value index -- `
fn word_store(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    interpreter.require_depth(2)?;

    let size = interpreter.stack().len() - 2;
    let index = interpreter.stack()[size + 1].clone();

    if !index.is_numeric() {
        return script_error(interpreter, format!("Expected an index, found {}.", index.repr()));
    }

    let index = check_stack_index(interpreter, index.get_int_val(), size)?;

    let _ = interpreter.pop()?;
    let value = interpreter.pop()?;

    interpreter.stack_mut()[index] = value;

    Ok(())
}

/// Register the stack words with the interpreter.
pub fn register_stack_words(interpreter: &mut dyn Interpreter) {
    add_native_word!(
        interpreter,
        "dup",
        word_dup,
        "Duplicate the top value on the data stack.",
        "value -- value value"
    );

    add_native_word!(
        interpreter,
        "drop",
        word_drop,
        "Discard the top value on the data stack.",
        "value -- "
    );

    add_native_word!(
        interpreter,
        "swap",
        word_swap,
        "Swap the top 2 values on the data stack.",
        "a b -- b a"
    );

    add_native_word!(
        interpreter,
        "2swap",
        word_2swap,
        "Swap the top 2 pairs of values on the data stack.",
        "a b c d -- c d a b"
    );

    add_native_word!(
        interpreter,
        "over",
        word_over,
        "Copy the second value to the top of the stack.",
        "a b -- a b a"
    );

    add_native_word!(
        interpreter,
        "rot",
        word_rot,
        "Rotate the third value to the top of the stack.",
        "a b c -- b c a"
    );

    add_native_word!(
        interpreter,
        "-rot",
        word_reverse_rot,
        "Rotate the top value under the next two.",
        "a b c -- c a b"
    );

    add_native_word!(
        interpreter,
        "nip",
        word_nip,
        "Discard the second value on the stack.",
        "a b -- b"
    );

    add_native_word!(
        interpreter,
        "2dup",
        word_2dup,
        "Duplicate the top pair of values.",
        "a b -- a b a b"
    );

    add_native_word!(
        interpreter,
        "depth",
        word_stack_depth,
        "Get the depth of the stack before calling this word.",
        " -- depth"
    );

    add_native_word!(
        interpreter,
        "clear",
        word_clear,
        "Remove every value from the data stack.",
        "... -- "
    );

    add_native_word!(
        interpreter,
        "@",
        word_fetch,
        "Copy the value at a stack index, counting from the bottom.",
        "index -- value"
    );

    add_native_word!(
        interpreter,
        "!",
        word_store,
        "Overwrite the value at a stack index, counting from the bottom.",
        "value index -- "
    );
}
