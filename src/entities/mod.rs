// Reference data for the resale dataset: the fixed set of HDB towns
// and flat types used to order, group, and validate filter options.

pub mod flat_type;
pub mod town;

pub use flat_type::FlatType;
pub use town::{Region, Town, TownRegistry};
