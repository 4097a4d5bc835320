//! A1-style cell references.

/// Converts a 0-based column index to its letters (`0` is `A`, `26` is `AA`).
pub fn column_name(column: usize) -> String {
    let mut column = column + 1;
    let mut name = Vec::new();
    while column > 0 {
        column -= 1;
        name.push(b'A' + (column % 26) as u8);
        column /= 26;
    }
    name.reverse();
    String::from_utf8_lossy(&name).into_owned()
}

/// Converts 0-based row and column indexes to an A1-style reference.
pub fn index_to_reference(row: usize, column: usize) -> String {
    format!("{}{}", column_name(column), row + 1)
}
