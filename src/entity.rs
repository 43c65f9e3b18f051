/*!
The values the demonstration puts behind handles.
*/

/**
Something that can describe itself with a fixed line of text.
 */
pub trait Identify {
    fn identify(&self) -> &'static str;
}

macro_rules! entity {
    ($(#[$meta:meta])* $name:ident => $line:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq)]
        pub struct $name {
            line: &'static str,
        }

        impl $name {
            pub fn new() -> Self {
                $name { line: $line }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                $name::new()
            }
        }

        impl Identify for $name {
            fn identify(&self) -> &'static str {
                self.line
            }
        }

        impl Drop for $name {
            fn drop(&mut self) {
                tracing::trace!("{} dropped", stringify!($name));
            }
        }
    };
}

entity! {
    /// Owned through an exclusive handle.
    Foo => "Foo::prnt()"
}

entity! {
    /// Owned through shared handles.
    Bar => "Bar::prnt()"
}

entity! {
    /// Owned through a shared handle and observed through a weak one.
    FooBar => "FooBar::print()"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identify_lines() {
        assert_eq!("Foo::prnt()", Foo::new().identify());
        assert_eq!("Bar::prnt()", Bar::new().identify());
        assert_eq!("FooBar::print()", FooBar::default().identify());
    }

    #[test]
    fn entities_are_not_zero_sized() {
        // Zero-sized values never touch the heap, so they'd all share one address
        assert_ne!(0, std::mem::size_of::<Foo>());
        assert_ne!(0, std::mem::size_of::<Bar>());
        assert_ne!(0, std::mem::size_of::<FooBar>());
    }
}
