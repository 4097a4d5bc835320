//! Low-level text, XML and ZIP utilities used by the spreadsheet and writer modules.
pub(crate) mod string;
pub(crate) mod xml;
pub(crate) mod zip;
