/**
Whether a handle is currently bound to a value.
 */
pub trait IsNull {
    fn is_null(&self) -> bool;
}
