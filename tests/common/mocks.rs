//! Mocks for the seams a test needs to control.
use mockall::mock;

use std::io::{self, Write};

use csv_mapper::core::processor::RowValidator;

use super::Employee;

mock! {
    pub File {}
    impl Write for File {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize>;
        fn flush(&mut self) -> io::Result<()>;
    }
}

mock! {
    pub Validator {}
    impl RowValidator<Employee> for Validator {
        fn validate(&self, record: &Employee, row_number: usize) -> Result<(), String>;
    }
}
