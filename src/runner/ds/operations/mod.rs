//! Abstract operations: type coercions, comparisons, arithmetic and prototype-walking object
//! algorithms.

pub mod arithmetic;
pub mod object;
pub mod test_and_comparison;
pub mod type_conversion;
