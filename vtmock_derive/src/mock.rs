// vim: tw=80
use super::*;

use std::collections::HashMap;

use syn::{
    braced,
    parse::{Parse, ParseStream},
    spanned::Spanned,
};

use crate::{
    automock::Attrs,
    mock_trait::MockTrait,
};

/// One `impl Trait for Name { ... }` block of a `mock!` invocation
struct ImplBlock {
    unsafety: Option<Token![unsafe]>,
    path: Path,
    self_ty: Ident,
    items: Vec<TraitItem>,
}

impl Parse for ImplBlock {
    fn parse(input: ParseStream) -> Result<Self> {
        // Attributes on the block have no meaning for a mock
        let _attrs = input.call(Attribute::parse_outer)?;
        let unsafety: Option<Token![unsafe]> = input.parse()?;
        let _: Token![impl] = input.parse()?;
        let path: Path = input.parse()?;
        let _: Token![for] = input.parse()?;
        let self_ty: Ident = input.parse()?;
        let content;
        braced!(content in input);
        let mut items = Vec::new();
        while !content.is_empty() {
            items.push(content.parse()?);
        }
        Ok(ImplBlock { unsafety, path, self_ty, items })
    }
}

/// The raw contents of a `mock!` invocation
struct MockInput {
    attrs: Vec<Attribute>,
    vis: Visibility,
    name: Ident,
    impls: Vec<ImplBlock>,
}

impl Parse for MockInput {
    fn parse(input: ParseStream) -> Result<Self> {
        let attrs = input.call(Attribute::parse_outer)?;
        let vis: Visibility = input.parse()?;
        let name: Ident = input.parse()?;
        if input.peek(Token![<]) {
            let generics: Generics = input.parse()?;
            return Err(Error::new(generics.span(),
                "generic mocks are not supported"));
        }
        let body;
        braced!(body in input);
        if !body.is_empty() {
            return Err(body.error(
                "mock! can only mock trait methods.  Move them into an \
                 `impl Trait for Name` block"));
        }

        let mut impls = Vec::new();
        while !input.is_empty() {
            let block: ImplBlock = input.parse()?;
            if block.self_ty != name {
                return Err(Error::new(block.self_ty.span(),
                    format!("expected `{}`", name)));
            }
            impls.push(block);
        }
        Ok(MockInput { attrs, vis, name, impls })
    }
}

impl MockInput {
    fn into_mock(self) -> Result<Mock> {
        let mut attrs = Attrs::default();
        let mut debug = false;
        let mut struct_attrs = Vec::new();
        for attr in self.attrs {
            if attr.path().is_ident("vtmock") {
                attr.parse_nested_meta(|meta| attrs.parse_meta(meta))?;
            } else if attr.path().is_ident("derive") {
                attr.parse_nested_meta(|meta| {
                    if meta.path.is_ident("Debug") {
                        debug = true;
                        Ok(())
                    } else {
                        Err(meta.error("mock! can only derive Debug"))
                    }
                })?;
            } else {
                struct_attrs.push(attr);
            }
        }

        let name = gen_mock_ident(&self.name);
        let mut traits: Vec<MockTrait> = Vec::new();
        let mut first_slot = 0;
        for block in self.impls {
            let trait_ = MockTrait::new(&name, block.path, block.unsafety,
                                        &Generics::default(), &block.items,
                                        first_slot)?;
            if let Some(prev) = traits.iter()
                .find(|t| t.ident() == trait_.ident())
            {
                return Err(Error::new(trait_.ident().span(),
                    format!("trait `{}` is implemented more than once",
                        prev.ident())));
            }
            first_slot += trait_.methods.len();
            traits.push(trait_);
        }
        Mock::new(attrs, struct_attrs, self.vis, name, traits, debug)
    }
}

/// A mock struct and everything that's generated for it
pub(crate) struct Mock {
    attrs: Attrs,
    /// Attributes passed through to the struct, like doc comments
    struct_attrs: Vec<Attribute>,
    vis: Visibility,
    /// Name of the mock struct, like `MockFoo`
    name: Ident,
    traits: Vec<MockTrait>,
    /// Implement `Debug` for the mock?
    debug: bool,
}

impl Mock {
    pub(crate) fn new(attrs: Attrs,
                      struct_attrs: Vec<Attribute>,
                      vis: Visibility,
                      name: Ident,
                      mut traits: Vec<MockTrait>,
                      debug: bool) -> Result<Self>
    {
        let nmethods: usize = traits.iter().map(|t| t.methods.len()).sum();
        if nmethods > attrs.capacity {
            return Err(Error::new(name.span(),
                format!("{} has {} methods, more than its capacity of {}",
                    name, nmethods, attrs.capacity)));
        }
        // Disambiguate the expect_ methods of methods whose names collide
        let mut counts = HashMap::<String, usize>::new();
        for mf in traits.iter().flat_map(|t| t.methods.iter()) {
            *counts.entry(mf.name().to_string()).or_default() += 1;
        }
        for mf in traits.iter_mut().flat_map(|t| t.methods.iter_mut()) {
            if counts[&mf.name().to_string()] > 1 {
                mf.qualify_expect_ident();
            }
        }
        Ok(Mock { attrs, struct_attrs, vis, name, traits, debug })
    }

    pub(crate) fn gen(&self) -> Result<TokenStream> {
        let mock = &self.name;
        let vis = &self.vis;
        let struct_attrs = &self.struct_attrs;
        let mod_ident = gen_mod_ident(mock);
        let methods_ident = gen_methods_ident(mock);
        let name_str = mock.to_string();
        let capacity = self.attrs.capacity;
        let functions = self.traits.iter()
            .flat_map(|t| t.methods.iter())
            .collect::<Vec<_>>();

        let expect_methods = functions.iter()
            .map(|mf| mf.gen_expect_method(mock));
        let modules = functions.iter().map(|mf| mf.gen_module());
        let ids = functions.iter().map(|mf| mf.id_path(mock));
        let method_impls = functions.iter().map(|mf| mf.gen_method_impl(mock));
        let markers = self.traits.iter().map(MockTrait::gen_markers);
        let trait_impls = self.traits.iter().map(|t| t.gen_impl(mock));

        // Re-export the markers whose names are unique within the mock
        let mut counts = HashMap::<String, usize>::new();
        for mf in functions.iter() {
            *counts.entry(mf.name().to_string()).or_default() += 1;
        }
        for t in self.traits.iter() {
            *counts.entry(t.ident().to_string()).or_default() += 1;
        }
        let counts = &counts;
        let reexports = self.traits.iter().flat_map(move |t| {
            let trait_ident = t.ident();
            t.methods.iter()
                .filter(move |mf| counts[&mf.name().to_string()] == 1)
                .map(move |mf| {
                    let name = mf.name();
                    quote!(pub use self::#trait_ident::#name;)
                })
        }).collect::<Vec<_>>();

        let debug_impl = if self.debug {
            quote!(
                impl ::std::fmt::Debug for #mock {
                    fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>)
                        -> ::std::fmt::Result
                    {
                        f.debug_struct(#name_str)
                            .field("instance", &::std::format_args!("{}",
                                self.__vtmock.instance()))
                            .field("strictness", &self.__vtmock.strictness())
                            .finish()
                    }
                }
            )
        } else {
            TokenStream::new()
        };
        let methods_doc = format!("Method markers of `{}`", mock);

        Ok(quote!(
            #(#struct_attrs)*
            #vis struct #mock {
                __vtmock: ::vtmock::Recorder,
            }

            #[allow(dead_code)]
            impl #mock {
                /// Create a nice mock with no expectations
                pub fn new() -> Self {
                    Self::with_strictness(::vtmock::Strictness::Nice)
                }

                /// Create a mock that logs unexpected calls and returns
                /// their default values
                pub fn nice() -> Self {
                    Self::with_strictness(::vtmock::Strictness::Nice)
                }

                /// Create a mock that fails the test on any unexpected call
                pub fn strict() -> Self {
                    Self::with_strictness(::vtmock::Strictness::Strict)
                }

                /// Create a mock that silently accepts unexpected calls
                pub fn permissive() -> Self {
                    Self::with_strictness(::vtmock::Strictness::Permissive)
                }

                pub fn with_strictness(strictness: ::vtmock::Strictness)
                    -> Self
                {
                    #mock {
                        __vtmock: ::vtmock::Recorder::new(#name_str, strictness)
                    }
                }

                #(#expect_methods)*
            }

            impl ::std::default::Default for #mock {
                fn default() -> Self {
                    Self::new()
                }
            }

            #debug_impl

            impl ::vtmock::Mock for #mock {
                const NAME: &'static str = #name_str;
                const CAPACITY: usize = #capacity;
                const METHODS: &'static [::vtmock::MethodId] = &[#(#ids),*];

                fn recorder(&self) -> &::vtmock::Recorder {
                    &self.__vtmock
                }

                fn recorder_mut(&mut self) -> &mut ::vtmock::Recorder {
                    &mut self.__vtmock
                }
            }

            #[doc(hidden)]
            #[allow(dead_code, non_snake_case)]
            #vis mod #mod_ident {
                #[allow(unused_imports)]
                use super::*;
                #(#modules)*
            }

            #[doc = #methods_doc]
            #[allow(dead_code, non_camel_case_types, non_snake_case)]
            #vis mod #methods_ident {
                #(#markers)*
                #(#reexports)*
            }

            #(#method_impls)*

            #(#trait_impls)*
        ))
    }
}

pub(crate) fn do_mock(input: TokenStream) -> TokenStream {
    into_tokens(
        parse2::<MockInput>(input)
            .and_then(MockInput::into_mock)
            .and_then(|mock| mock.gen())
    )
}
