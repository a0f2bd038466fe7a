// src/macros.rs
#[macro_export]
macro_rules! s {
    // String shorthand!

    // Zero-arg → String::new()
    () => {
        ::std::string::String::new()
    };
    // Any single expression: literal, const or variable
    ($expr:expr) => {
        ::std::string::String::from($expr)
    };
}

#[macro_export]
macro_rules! cols {
    // Owned header list from column-name consts: cols![PLACE, STATE_CODE]
    ($($col:expr),* $(,)?) => {
        ::std::vec![$(::std::string::String::from($col)),*]
    };
}
