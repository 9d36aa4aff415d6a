#![allow(dead_code)]

use std::{
    cell::RefCell,
    io::{self, Write},
    rc::Rc,
};
use wordsmith::{
    runtime::data_structures::value::Value, CodeManagement, InterpreterConfig, InterpreterStack,
    WordsmithInterpreter,
};

/// An output sink the test keeps a handle to after giving it to the interpreter.
#[derive(Clone, Default)]
pub struct SharedBuffer(Rc<RefCell<Vec<u8>>>);

impl SharedBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.borrow()).to_string()
    }

    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// A session with the standard library loaded and output captured.
pub fn session() -> (WordsmithInterpreter, SharedBuffer) {
    let mut interpreter =
        WordsmithInterpreter::with_config(&InterpreterConfig::default()).unwrap();
    let output = SharedBuffer::default();

    interpreter.set_output(Box::new(output.clone()));
    (interpreter, output)
}

/// A session with only the native words.
pub fn bare_session() -> (WordsmithInterpreter, SharedBuffer) {
    let config = InterpreterConfig {
        load_stdlib: false,
        ..InterpreterConfig::default()
    };

    let mut interpreter = WordsmithInterpreter::with_config(&config).unwrap();
    let output = SharedBuffer::default();

    interpreter.set_output(Box::new(output.clone()));
    (interpreter, output)
}

/// Run source through the recovering outer loop and return what it printed.
pub fn run(source: &str) -> (WordsmithInterpreter, String) {
    let (mut interpreter, output) = session();

    interpreter.process_source("<test>", source).unwrap();
    (interpreter, output.contents())
}

/// The data stack as integers.
pub fn int_stack(interpreter: &WordsmithInterpreter) -> Vec<i64> {
    interpreter.stack().iter().map(Value::get_int_val).collect()
}
