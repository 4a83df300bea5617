// vim: tw=80
//! Proc Macros for use with vtmock
//!
//! You probably don't want to use this crate directly.  Instead, use its
//! reexports via the [`vtmock`](../vtmock/index.html) crate.

extern crate proc_macro;

use proc_macro2::{Span, TokenStream};
use quote::{ToTokens, format_ident, quote};
use syn::{
    *,
    visit_mut::{self, VisitMut},
};

mod automock;
mod mock;
mod mock_function;
mod mock_trait;

use crate::automock::do_automock;
use crate::mock::do_mock;

/// Maximum number of methods per mock, unless overridden with `capacity`.
/// Must equal `vtmock::DEFAULT_CAPACITY`.
const DEFAULT_CAPACITY: usize = 64;

/// How deeply the per-method modules are nested below the mock's own scope
const MODULE_LEVELS: usize = 2;

/// Generate a mock identifier from the regular one: eg "Foo" => "MockFoo"
fn gen_mock_ident(ident: &Ident) -> Ident {
    format_ident!("Mock{}", ident, span = ident.span())
}

/// Generate an identifier for the mock struct's private module: eg "MockFoo"
/// => "__mock_MockFoo"
fn gen_mod_ident(mock: &Ident) -> Ident {
    format_ident!("__mock_{}", mock)
}

/// Generate an identifier for the mock's module of method markers: eg
/// "MockFoo" => "MockFooMethods"
fn gen_methods_ident(mock: &Ident) -> Ident {
    format_ident!("{}Methods", mock)
}

/// Convert a CamelCase identifier to snake_case: eg "ExtendedInterface" =>
/// "extended_interface"
fn snake_case(ident: &Ident) -> String {
    let s = ident.to_string();
    let mut out = String::with_capacity(s.len() + 4);
    let mut prev_lower = false;
    for c in s.chars() {
        if c.is_uppercase() {
            if prev_lower {
                out.push('_');
            }
            out.extend(c.to_lowercase());
            prev_lower = false;
        } else {
            out.push(c);
            prev_lower = c.is_lowercase() || c.is_ascii_digit();
        }
    }
    out
}

/// Render a type the way a human would write it: eg "& mut Vec < u8 >" =>
/// "&mut Vec<u8>"
fn type_string(ty: &Type) -> String {
    fn wordy(c: char) -> bool {
        c.is_alphanumeric() || c == '_' || c == '\''
    }
    fn spaced(piece: &str) -> bool {
        matches!(piece, "->" | "+" | "=")
    }

    let s = ty.to_token_stream().to_string();
    let mut out = String::with_capacity(s.len());
    let mut prev: Option<&str> = None;
    for piece in s.split_whitespace() {
        if let Some(p) = prev {
            let pc = p.chars().last().unwrap_or(' ');
            let nc = piece.chars().next().unwrap_or(' ');
            if (wordy(pc) && wordy(nc)) || pc == ',' || spaced(p) ||
                spaced(piece)
            {
                out.push(' ');
            }
        }
        out.push_str(piece);
        prev = Some(piece);
    }
    out
}

/// Rewrite paths so they still resolve from `levels` modules deeper: eg
/// "super::Foo" => "super::super::super::Foo" for two levels
struct Supersuperfier {
    levels: usize,
}

impl VisitMut for Supersuperfier {
    fn visit_path_mut(&mut self, path: &mut Path) {
        let relative = path.leading_colon.is_none() &&
            path.segments.first()
                .map(|seg| seg.ident == "super" || seg.ident == "self")
                .unwrap_or(false);
        if relative {
            let mut segments = punctuated::Punctuated::new();
            for _ in 0..self.levels {
                segments.push(PathSegment::from(
                    Ident::new("super", Span::call_site())));
            }
            for seg in path.segments.iter() {
                if seg.ident != "self" {
                    segments.push(seg.clone());
                }
            }
            path.segments = segments;
        }
        visit_mut::visit_path_mut(self, path);
    }
}

/// Replace `Self` with the concrete mock type
struct Deselfifier<'a> {
    mock: &'a Ident,
}

impl VisitMut for Deselfifier<'_> {
    fn visit_type_mut(&mut self, ty: &mut Type) {
        if let Type::Path(tp) = ty {
            if tp.qself.is_none() && tp.path.is_ident("Self") {
                let mock = self.mock;
                *ty = parse_quote!(#mock);
                return;
            }
        }
        visit_mut::visit_type_mut(self, ty);
    }
}

/// Make a type from the user's scope usable inside the per-method modules
fn supersuperfy(ty: &Type, mock: &Ident) -> Type {
    let mut output = ty.clone();
    Deselfifier { mock }.visit_type_mut(&mut output);
    Supersuperfier { levels: MODULE_LEVELS }.visit_type_mut(&mut output);
    output
}

/// Manually mock one or more traits with a single struct.
///
/// `#[automock]` can't mock a trait together with its supertraits.  `mock!`
/// can: it takes the name of the mock and one `impl` block per trait,
/// repeating each trait's method signatures.  The generated struct is named
/// after the given name with `Mock` prepended.
///
/// The format is:
///
/// * Optional attributes.  `#[derive(Debug)]` implements `Debug` for the
///   mock, and `#[vtmock(capacity = N)]` raises or lowers the limit on the
///   number of methods.
/// * Optional visibility specifier
/// * The name, followed by an empty `{}` block
/// * One `impl Trait for Name { ... }` block per trait, with the methods
///   written without bodies
///
/// Methods are numbered in the order they are written, across all `impl`
/// blocks.  If two traits declare methods of the same name, the expectation
/// methods are disambiguated with the trait's name: `expect_a_put` and
/// `expect_b_put` for `A::put` and `B::put`.
///
/// # Examples
///
/// ```ignore
/// # use vtmock::*;
/// trait Interface {
///     fn get(&self) -> bool;
/// }
/// trait ExtendedInterface: Interface {
///     fn foo(&self, b: bool);
///     fn bar(&self, b: bool);
/// }
/// mock! {
///     #[derive(Debug)]
///     pub Extended {}
///     impl Interface for Extended {
///         fn get(&self) -> bool;
///     }
///     impl ExtendedInterface for Extended {
///         fn foo(&self, b: bool);
///         fn bar(&self, b: bool);
///     }
/// }
/// # fn main() {}
/// ```
///
/// Inherent methods can't be mocked:
/// ```ignore
/// # use vtmock::*;
/// mock! {
///     pub Thing {
///         fn frob(&self);
///     }
/// }
/// # fn main() {}
/// ```
#[proc_macro]
pub fn mock(item: proc_macro::TokenStream) -> proc_macro::TokenStream {
    do_mock(item.into()).into()
}

/// Automatically generate a mock type for a trait.
///
/// This is the easiest way to use vtmock.  It generates a struct named after
/// the trait with `Mock` prepended, which implements the trait.  For each
/// method of the trait the mock has a method named `expect_whatever` that
/// adds an expectation, and a marker type of the same name as the method in
/// the `MockWhateverMethods` module.
///
/// The only attribute is `capacity = N`, the most methods the trait may
/// have.  It defaults to `vtmock::DEFAULT_CAPACITY`.
///
/// # Examples
///
/// ```ignore
/// # use vtmock::*;
/// #[automock]
/// pub trait Foo {
///     fn foo(&self, key: i16);
/// }
///
/// # fn main() {
/// let mock = MockFoo::new();
/// # std::mem::drop(mock);
/// # }
/// ```
///
/// Traits with supertraits must use [`mock!`] instead:
/// ```ignore
/// # use vtmock::*;
/// trait Base {
///     fn base(&self);
/// }
/// #[automock]
/// trait Derived: Base {
///     fn derived(&self);
/// }
/// # fn main() {}
/// ```
#[proc_macro_attribute]
pub fn automock(attrs: proc_macro::TokenStream, input: proc_macro::TokenStream)
    -> proc_macro::TokenStream
{
    let input: proc_macro2::TokenStream = input.into();
    let mut output = input.clone();
    output.extend(do_automock(attrs.into(), input));
    output.into()
}

/// Turn a parse or validation error into something the compiler will report
fn into_tokens(r: Result<TokenStream>) -> TokenStream {
    match r {
        Ok(ts) => ts,
        Err(e) => e.to_compile_error(),
    }
}
