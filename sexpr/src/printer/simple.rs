use std::fmt;

use crate::escape::{is_simple_symbol, write_escaped};

use super::{Print, Printer};

/// Printer that writes the canonical single-line form into a [`fmt::Write`] sink.
pub struct SimplePrinter<'w, W> {
    needs_whitespace: bool,
    out: &'w mut W,
}

impl<'w, W: fmt::Write> SimplePrinter<'w, W> {
    pub fn new(out: &'w mut W) -> Self {
        Self {
            needs_whitespace: false,
            out,
        }
    }

    #[inline]
    fn separate(&mut self) -> fmt::Result {
        if self.needs_whitespace {
            self.out.write_char(' ')?;
        }
        self.needs_whitespace = true;
        Ok(())
    }

    #[inline]
    fn print_delimited<F>(&mut self, open: &str, f: F) -> fmt::Result
    where
        F: FnOnce(&mut Self) -> fmt::Result,
    {
        self.separate()?;
        self.out.write_str(open)?;
        self.needs_whitespace = false;
        f(self)?;
        self.out.write_char(')')?;
        self.needs_whitespace = true;
        Ok(())
    }
}

impl<W: fmt::Write> Printer for SimplePrinter<'_, W> {
    type Error = fmt::Error;

    fn atom(&mut self, atom: &str) -> Result<(), Self::Error> {
        self.separate()?;
        self.out.write_str(atom)
    }

    fn symbol(&mut self, symbol: &str) -> Result<(), Self::Error> {
        self.separate()?;
        if is_simple_symbol(symbol) {
            self.out.write_str(symbol)
        } else {
            write_escaped(self.out, symbol, '|')
        }
    }

    fn string(&mut self, string: &str) -> Result<(), Self::Error> {
        self.separate()?;
        write_escaped(self.out, string, '"')
    }

    #[inline]
    fn list<F>(&mut self, f: F) -> Result<(), Self::Error>
    where
        F: FnOnce(&mut Self) -> Result<(), Self::Error>,
    {
        self.print_delimited("(", f)
    }

    #[inline]
    fn vector<F>(&mut self, f: F) -> Result<(), Self::Error>
    where
        F: FnOnce(&mut Self) -> Result<(), Self::Error>,
    {
        self.print_delimited("#(", f)
    }

    #[inline]
    fn bytevector<F>(&mut self, f: F) -> Result<(), Self::Error>
    where
        F: FnOnce(&mut Self) -> Result<(), Self::Error>,
    {
        self.print_delimited("#u8(", f)
    }

    fn prefixed<F>(&mut self, prefix: &str, f: F) -> Result<(), Self::Error>
    where
        F: FnOnce(&mut Self) -> Result<(), Self::Error>,
    {
        self.separate()?;
        self.out.write_str(prefix)?;
        self.needs_whitespace = false;
        f(self)
    }
}

/// Print a `T` into a [`fmt::Write`] sink.
///
/// The output is the canonical form: a single line with one space between
/// the elements of an aggregate.
pub fn write<T: Print, W: fmt::Write>(value: T, out: &mut W) -> fmt::Result {
    let mut printer = SimplePrinter::new(out);
    value.print(&mut printer)
}

/// Print a `T` into an s-expression string.
///
/// This function does not produce any line breaks or indentation.
/// Where human readability is a concern, consider using the [`to_string_pretty`] function instead.
///
/// [`to_string_pretty`]: `crate::printer::to_string_pretty`
pub fn to_string<T: Print>(value: T) -> String {
    let mut string = String::new();
    // Writing into a `String` does not fail.
    let _ = write(value, &mut string);
    string
}
