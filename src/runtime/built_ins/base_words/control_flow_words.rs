use crate::{
    add_native_immediate_word, add_native_word,
    lang::code::{Entry, WordHandler},
    location_here,
    runtime::{
        data_structures::{control_stack::ControlMarker, value::Value},
        error::{self, invalid_usage},
        interpreter::Interpreter,
    },
};
use std::rc::Rc;

/// Conditional branch.  Jump to the address when the flag is false.
///
/// Signature: `flag address -- `
fn word_zero_branch(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    require_body(interpreter, "0branch")?;
    interpreter.require_depth(2)?;

    let address = interpreter.pop_as_int()?;
    let flag = interpreter.pop_as_bool()?;

    if !flag {
        interpreter.jump_to("0branch", address)?;
    }

    Ok(())
}

/// Unconditional branch within the current body.
///
/// Signature: `address -- `
fn word_branch(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    require_body(interpreter, "branch")?;

    let address = interpreter.pop_as_int()?;
    interpreter.jump_to("branch", address)
}

/// Same as branch, kept under it's classic name.
///
/// Signature: `address -- `
fn word_jmp(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    require_body(interpreter, "jmp")?;

    let address = interpreter.pop_as_int()?;
    interpreter.jump_to("jmp", address)
}

/// Return early from the current word.
///
/// Signature: ` -- `
fn word_exit(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    interpreter.exit_body("exit")
}

/// Branch words only make sense inside a running definition.
fn require_body(interpreter: &dyn Interpreter, word: &str) -> error::Result<()> {
    if !interpreter.is_executing_body() {
        invalid_usage(interpreter, word, "only usable inside a compiled definition")?;
    }

    Ok(())
}

/// A fresh branch entry to compile into a body, independent of whatever the dictionary currently
/// calls `0branch` or `branch`.
fn branch_entry(name: &str, handler: Rc<WordHandler>, signature: &str) -> Entry {
    Entry::native(
        name,
        location_here!(),
        handler,
        false,
        "Compiled branch.",
        signature,
    )
}

fn zero_branch_entry() -> Entry {
    branch_entry("0branch", Rc::new(word_zero_branch), "flag address -- ")
}

fn always_branch_entry() -> Entry {
    branch_entry("branch", Rc::new(word_branch), "address -- ")
}

/// Where the body under construction starts on the data stack.
fn body_base(interpreter: &dyn Interpreter, word: &str) -> error::Result<usize> {
    match interpreter.control_stack().body_base() {
        Some(base) => Ok(base),
        None => invalid_usage(interpreter, word, "only usable inside a definition"),
    }
}

/// The body relative index of the next step to be compiled.
fn next_index(interpreter: &dyn Interpreter, base: usize) -> usize {
    interpreter.stack().len().saturating_sub(base)
}

/// Compile a branch target to be filled in later, returning it's slot on the data stack.
fn compile_placeholder(interpreter: &mut dyn Interpreter) -> usize {
    let slot = interpreter.stack().len();

    interpreter.push(Value::Word(Entry::anonymous_literal(Value::None)));
    slot
}

/// Fill in a branch target so that it points at the next step to be compiled.
fn patch_placeholder(interpreter: &mut dyn Interpreter, slot: usize, base: usize) {
    let target = next_index(interpreter, base) as i64;

    if let Some(value) = interpreter.stack_mut().get_mut(slot) {
        *value = Value::Word(Entry::anonymous_literal(Value::Int(target)));
    }
}

/// Compile a literal branch target.
fn compile_target(interpreter: &mut dyn Interpreter, target: usize) {
    interpreter.push(Value::Word(Entry::anonymous_literal(Value::Int(target as i64))));
}

/// Throw away the dead code collected by an interpreted `if` or `else`.  The marker on top of the
/// control stack is the conditional itself, the one below it is the collection.
fn discard_dead_code(interpreter: &mut dyn Interpreter, word: &str) -> error::Result<()> {
    let depth = match interpreter.control_stack().below_top() {
        Some(ControlMarker::Paren { depth }) => *depth,
        _ => return invalid_usage(interpreter, word, "the skipped code is no longer being collected"),
    };

    let _ = interpreter.control_stack_mut().pop();
    let _ = interpreter.control_stack_mut().pop();

    let depth = depth.min(interpreter.stack().len());

    interpreter.truncate_stack(depth);
    interpreter.end_compiling();

    Ok(())
}

/// Start collecting code that won't be run.
fn collect_dead_code(interpreter: &mut dyn Interpreter) {
    let depth = interpreter.stack().len();

    interpreter
        .control_stack_mut()
        .push(ControlMarker::Paren { depth });
    interpreter.begin_compiling();
}

/// Start a conditional.  At the top level the flag is tested right away and a false branch is
/// collected and thrown away.  In a definition a conditional jump is compiled.
///
/// Signature: `flag -- `
fn word_if(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    if interpreter.is_compiling() {
        body_base(interpreter, "if")?;

        let patch = compile_placeholder(interpreter);

        interpreter.push(Value::Word(zero_branch_entry()));
        interpreter
            .control_stack_mut()
            .push(ControlMarker::CompiledIf { patch });

        return Ok(());
    }

    let condition = interpreter.pop_as_bool()?;

    if !condition {
        collect_dead_code(interpreter);
    }

    interpreter
        .control_stack_mut()
        .push(ControlMarker::If { condition });

    Ok(())
}

/// Switch to the other side of a conditional.
///
/// Signature: ` -- `
fn word_else(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    match interpreter.control_stack().top().cloned() {
        Some(ControlMarker::If { condition: false }) => {
            discard_dead_code(interpreter, "else")?;

            interpreter
                .control_stack_mut()
                .push(ControlMarker::Else { condition: false });
        }

        Some(ControlMarker::If { condition: true }) => {
            let _ = interpreter.control_stack_mut().pop();

            collect_dead_code(interpreter);
            interpreter
                .control_stack_mut()
                .push(ControlMarker::Else { condition: true });
        }

        Some(ControlMarker::CompiledIf { patch }) => {
            let base = body_base(interpreter, "else")?;
            let _ = interpreter.control_stack_mut().pop();

            let skip = compile_placeholder(interpreter);
            interpreter.push(Value::Word(always_branch_entry()));

            patch_placeholder(interpreter, patch, base);
            interpreter
                .control_stack_mut()
                .push(ControlMarker::CompiledElse { patch: skip });
        }

        other => {
            let found = other.map_or("nothing is open".to_string(), |marker| {
                format!("found '{}' instead", marker.opener())
            });

            return invalid_usage(
                interpreter,
                "else",
                &format!("'else' used without a matching 'if', {}", found),
            );
        }
    }

    Ok(())
}

/// End a conditional.
///
/// Signature: ` -- `
fn word_then(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    match interpreter.control_stack().top().cloned() {
        Some(ControlMarker::If { condition: false })
        | Some(ControlMarker::Else { condition: true }) => {
            discard_dead_code(interpreter, "then")?;
        }

        Some(ControlMarker::If { condition: true })
        | Some(ControlMarker::Else { condition: false }) => {
            let _ = interpreter.control_stack_mut().pop();
        }

        Some(ControlMarker::CompiledIf { patch }) | Some(ControlMarker::CompiledElse { patch }) => {
            let base = body_base(interpreter, "then")?;
            let _ = interpreter.control_stack_mut().pop();

            patch_placeholder(interpreter, patch, base);
        }

        other => {
            let found = other.map_or("nothing is open".to_string(), |marker| {
                format!("found '{}' instead", marker.opener())
            });

            return invalid_usage(
                interpreter,
                "then",
                &format!("'then' used without a matching 'if', {}", found),
            );
        }
    }

    Ok(())
}

/// Mark the start of a loop.
///
/// Signature: ` -- `
fn word_begin(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    if !interpreter.is_compiling() {
        return invalid_usage(interpreter, "begin", "only usable inside a definition");
    }

    let base = body_base(interpreter, "begin")?;
    let target = next_index(interpreter, base);

    interpreter
        .control_stack_mut()
        .push(ControlMarker::Begin { target });

    Ok(())
}

/// Take the target of the innermost open loop.
fn loop_target(interpreter: &dyn Interpreter, word: &str) -> error::Result<usize> {
    match interpreter.control_stack().top() {
        Some(ControlMarker::Begin { target }) => Ok(*target),
        _ => invalid_usage(
            interpreter,
            word,
            &format!("'{}' used without a matching 'begin'", word),
        ),
    }
}

/// Close a loop that repeats until the flag is true.
///
/// Signature: `flag -- `
fn word_until(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    let target = loop_target(interpreter, "until")?;
    let _ = interpreter.control_stack_mut().pop();

    compile_target(interpreter, target);
    interpreter.push(Value::Word(zero_branch_entry()));

    Ok(())
}

/// Close a loop that repeats forever, or until `exit`.
///
/// Signature: ` -- `
fn word_again(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    let target = loop_target(interpreter, "again")?;
    let _ = interpreter.control_stack_mut().pop();

    compile_target(interpreter, target);
    interpreter.push(Value::Word(always_branch_entry()));

    Ok(())
}

/// Register the conditional, loop and branch words.
pub fn register_control_flow_words(interpreter: &mut dyn Interpreter) {
    add_native_immediate_word!(
        interpreter,
        "if",
        word_if,
        "Run the following code only if the flag is true.",
        "flag -- "
    );

    add_native_immediate_word!(
        interpreter,
        "else",
        word_else,
        "Run the following code only if the matching if's flag was false.",
        " -- "
    );

    add_native_immediate_word!(
        interpreter,
        "then",
        word_then,
        "End a conditional.",
        " -- "
    );

    add_native_immediate_word!(
        interpreter,
        "begin",
        word_begin,
        "Start a loop.",
        " -- "
    );

    add_native_immediate_word!(
        interpreter,
        "until",
        word_until,
        "Loop back to the matching begin until the flag is true.",
        "flag -- "
    );

    add_native_immediate_word!(
        interpreter,
        "again",
        word_again,
        "Loop back to the matching begin.",
        " -- "
    );

    add_native_word!(
        interpreter,
        "0branch",
        word_zero_branch,
        "Jump to the address within the current word if the flag is false.",
        "flag address -- "
    );

    add_native_word!(
        interpreter,
        "branch",
        word_branch,
        "Jump to the address within the current word.",
        "address -- "
    );

    add_native_word!(
        interpreter,
        "jmp",
        word_jmp,
        "Jump to the address within the current word.",
        "address -- "
    );

    add_native_word!(
        interpreter,
        "exit",
        word_exit,
        "Return from the current word.",
        " -- "
    );
}
