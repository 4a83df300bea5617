// vim: tw=80
use super::*;

use syn::spanned::Spanned;

use crate::mock_function::MockFunction;

/// One trait implemented by a mock
pub(crate) struct MockTrait {
    /// Path of the trait as written by the user
    path: Path,
    /// Last segment of `path`
    ident: Ident,
    unsafety: Option<Token![unsafe]>,
    pub methods: Vec<MockFunction>,
}

/// Accumulate errors, so the user sees all of them at once
fn push_error(errors: &mut Option<Error>, e: Error) {
    match errors {
        Some(es) => es.combine(e),
        None => *errors = Some(e),
    }
}

impl MockTrait {
    /// Create a new MockTrait
    ///
    /// # Arguments
    /// * `mock` -          Name of the mock struct
    /// * `path` -          The trait's path, as used in the mock's scope
    /// * `unsafety` -      Whether the trait is an `unsafe trait`
    /// * `generics` -      The trait's own generics.  Must be empty.
    /// * `items` -         The trait's items
    /// * `first_slot` -    Slot of the trait's first method
    pub fn new(mock: &Ident,
               path: Path,
               unsafety: Option<Token![unsafe]>,
               generics: &Generics,
               items: &[TraitItem],
               first_slot: usize) -> Result<Self>
    {
        let last = match path.segments.last() {
            Some(seg) => seg,
            None => return Err(Error::new(path.span(), "expected a trait"))
        };
        if !generics.params.is_empty() || generics.where_clause.is_some() ||
            !last.arguments.is_empty()
        {
            let span = if last.arguments.is_empty() {
                generics.span()
            } else {
                last.arguments.span()
            };
            return Err(Error::new(span, "generic traits can't be mocked"));
        }
        let ident = last.ident.clone();

        let mut errors = None;
        let mut methods = Vec::new();
        for item in items {
            match item {
                TraitItem::Fn(method) => {
                    let slot = first_slot + methods.len();
                    match MockFunction::new(mock, &ident, slot, method) {
                        Ok(mf) => methods.push(mf),
                        Err(e) => push_error(&mut errors, e)
                    }
                },
                TraitItem::Type(ty) => push_error(&mut errors,
                    Error::new(ty.span(),
                        "traits with associated types can't be mocked")),
                TraitItem::Const(c) => push_error(&mut errors,
                    Error::new(c.span(),
                        "traits with associated constants can't be mocked")),
                other => push_error(&mut errors,
                    Error::new(other.span(), "unsupported trait item")),
            }
        }
        match errors {
            Some(e) => Err(e),
            None => Ok(MockTrait { path, ident, unsafety, methods })
        }
    }

    pub fn ident(&self) -> &Ident {
        &self.ident
    }

    /// The marker types of this trait's methods, in a module named after the
    /// trait
    pub fn gen_markers(&self) -> TokenStream {
        let ident = &self.ident;
        let markers = self.methods.iter().map(MockFunction::gen_marker);
        quote!(
            pub mod #ident {
                #(#markers)*
            }
        )
    }

    /// Implement the trait for the mock struct
    pub fn gen_impl(&self, mock: &Ident) -> TokenStream {
        let path = &self.path;
        let unsafety = &self.unsafety;
        let methods = self.methods.iter()
            .map(|mf| mf.gen_impl_method(mock));
        quote!(
            #unsafety impl #path for #mock {
                #(#methods)*
            }
        )
    }
}

#[cfg(test)]
mod t {
    use super::*;
    use pretty_assertions::assert_eq;

    fn build(path: TokenStream, items: TokenStream, first_slot: usize)
        -> Result<MockTrait>
    {
        let item_trait: ItemTrait = parse2(quote!(trait Dummy { #items }))
            .unwrap();
        MockTrait::new(&format_ident!("MockFoo"), parse2(path).unwrap(), None,
                       &Generics::default(), &item_trait.items, first_slot)
    }

    #[test]
    fn slots_continue_from_first_slot() {
        let mt = build(quote!(Foo), quote!(
            fn a(&self);
            fn b(&self, x: u32) -> u32;
        ), 5).unwrap();
        let slots = mt.methods.iter()
            .map(MockFunction::slot)
            .collect::<Vec<_>>();
        assert_eq!(vec![5, 6], slots);
        assert_eq!("Foo", mt.ident().to_string());
    }

    #[test]
    fn path_is_kept() {
        let mt = build(quote!(super::io::Sink), quote!(fn put(&self);), 0)
            .unwrap();
        assert_eq!("Sink", mt.ident().to_string());
        let out = mt.gen_impl(&format_ident!("MockFoo")).to_string();
        assert!(out.starts_with("impl super :: io :: Sink for MockFoo"), "{}",
            out);
    }

    #[test]
    fn associated_type() {
        let e = build(quote!(Foo), quote!(type Item;), 0).err().unwrap();
        assert_eq!("traits with associated types can't be mocked",
                   e.to_string());
    }

    #[test]
    fn generic_trait() {
        let e = build(quote!(AsRef<u32>), quote!(), 0).err().unwrap();
        assert_eq!("generic traits can't be mocked", e.to_string());
    }

    #[test]
    fn reports_every_bad_method() {
        let e = build(quote!(Foo), quote!(
            fn a();
            fn b(&self);
            async fn c(&self);
        ), 0).err().unwrap();
        assert_eq!(2, e.into_iter().count());
    }
}
