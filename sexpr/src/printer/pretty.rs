use std::convert::Infallible;

use crate::escape::{escape_string, escape_symbol};

use super::{Print, Printer};
use pretty::DocAllocator as _;

/// A pretty printer that uses the `pretty` crate to format the output.
struct PrettyPrinter<'a> {
    arena: &'a pretty::Arena<'a>,
    items: Vec<pretty::DocBuilder<'a, pretty::Arena<'a>>>,
}

impl<'a> PrettyPrinter<'a> {
    /// Collects the items printed by `f` into one delimited group.
    fn delimited<F>(&mut self, open: &'static str, f: F) -> Result<(), Infallible>
    where
        F: FnOnce(&mut Self) -> Result<(), Infallible>,
    {
        let position = self.items.len();
        f(self)?;
        let items = self.items.drain(position..);

        let docs = self
            .arena
            .intersperse(items, self.arena.line())
            .nest(2)
            .group();

        self.items.push(
            self.arena
                .text(open)
                .append(docs)
                .append(self.arena.text(")")),
        );

        Ok(())
    }
}

impl<'a> Printer for PrettyPrinter<'a> {
    type Error = Infallible;

    fn atom(&mut self, atom: &str) -> Result<(), Self::Error> {
        let doc = self.arena.text(atom.to_string());
        self.items.push(doc);
        Ok(())
    }

    fn symbol(&mut self, symbol: &str) -> Result<(), Self::Error> {
        let doc = self.arena.text(escape_symbol(symbol));
        self.items.push(doc);
        Ok(())
    }

    fn string(&mut self, string: &str) -> Result<(), Self::Error> {
        let doc = self.arena.text(escape_string(string));
        self.items.push(doc);
        Ok(())
    }

    fn list<F>(&mut self, f: F) -> Result<(), Self::Error>
    where
        F: FnOnce(&mut Self) -> Result<(), Self::Error>,
    {
        self.delimited("(", f)
    }

    fn vector<F>(&mut self, f: F) -> Result<(), Self::Error>
    where
        F: FnOnce(&mut Self) -> Result<(), Self::Error>,
    {
        self.delimited("#(", f)
    }

    fn bytevector<F>(&mut self, f: F) -> Result<(), Self::Error>
    where
        F: FnOnce(&mut Self) -> Result<(), Self::Error>,
    {
        self.delimited("#u8(", f)
    }

    fn prefixed<F>(&mut self, prefix: &str, f: F) -> Result<(), Self::Error>
    where
        F: FnOnce(&mut Self) -> Result<(), Self::Error>,
    {
        let position = self.items.len();
        f(self)?;
        let items = self.items.drain(position..);

        let doc = self
            .arena
            .text(prefix.to_string())
            .append(self.arena.concat(items));
        self.items.push(doc);
        Ok(())
    }
}

/// Pretty print a `T` into an s-expression string.
///
/// Aggregates that do not fit into `width` columns are broken with one
/// element per line, indented by two spaces.
pub fn to_string_pretty<T: Print>(value: T, width: usize) -> String {
    let arena = pretty::Arena::new();
    let mut printer = PrettyPrinter {
        items: vec![],
        arena: &arena,
    };

    let _ = value.print(&mut printer);

    let doc = arena.intersperse(printer.items, arena.line());

    let mut string = String::new();
    let _ = doc.render_fmt(width, &mut string);
    string
}
