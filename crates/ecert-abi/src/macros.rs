//! Helper macros for ABI function generation.

/// Generate an exported `#[unsafe(no_mangle)] pub unsafe extern "C" fn`.
///
/// ```ignore
/// abi_fn! {
///     /// Doc comment for the function.
///     fn getInteger() -> c_int {
///         with_console("getInteger", Console::get_integer)
///     }
/// }
/// ```
///
/// The body runs inside an `unsafe` block so pointer arguments can be
/// dereferenced directly; each body carries its own `// SAFETY:` notes.
macro_rules! abi_fn {
    (
        $(#[$meta:meta])*
        fn $name:ident( $($arg:ident : $argty:ty),* $(,)? ) -> $ret:ty
        $body:block
    ) => {
        $(#[$meta])*
        #[unsafe(no_mangle)]
        #[allow(unused_unsafe)]
        pub unsafe extern "C" fn $name( $($arg : $argty),* ) -> $ret {
            unsafe { $body }
        }
    };

    // Variant without return type (returns ())
    (
        $(#[$meta:meta])*
        fn $name:ident( $($arg:ident : $argty:ty),* $(,)? )
        $body:block
    ) => {
        $(#[$meta])*
        #[unsafe(no_mangle)]
        #[allow(unused_unsafe)]
        pub unsafe extern "C" fn $name( $($arg : $argty),* ) {
            unsafe { $body }
        }
    };
}

pub(crate) use abi_fn;
