/*!
Every use of `unsafe` in the handles goes through one of these macros.

The first argument is the reason the operation is sound. It isn't used by the
expansion; it's there so the justification sits next to the code it covers.
*/

/**
Run an expression in an `unsafe` block.

```ignore
unsafe_block!("The pointer was produced by `Box::into_raw`" => Box::from_raw(ptr))
```
 */
#[macro_export]
macro_rules! unsafe_block {
    ($reason:tt => $body:expr) => {{
        #[allow(unused_unsafe)]
        unsafe {
            $body
        }
    }};
}

/**
Declare an `unsafe fn`.

The reason describes what callers must guarantee.
 */
#[macro_export]
macro_rules! unsafe_fn {
    ($reason:tt => $(#[$meta:meta])* $vis:vis fn $name:ident $($body:tt)*) => {
        $(#[$meta])*
        $vis unsafe fn $name $($body)*
    };
}

/**
Declare an `unsafe impl`, usually of `Send` or `Sync`.
 */
#[macro_export]
macro_rules! unsafe_impl {
    ($reason:tt => impl $($body:tt)*) => {
        unsafe impl $($body)*
    };
}
