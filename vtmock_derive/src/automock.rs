// vim: tw=80
use super::*;
use syn::{meta::ParseNestedMeta, parse::Parser, spanned::Spanned};

use crate::{mock::Mock, mock_trait::MockTrait};

/// Options shared by `#[automock(..)]` and `#[vtmock(..)]` inside `mock!`
#[derive(Debug)]
pub(crate) struct Attrs {
    pub capacity: usize,
}

impl Attrs {
    /// Parse one `name = value` item
    pub(crate) fn parse_meta(&mut self, meta: ParseNestedMeta) -> Result<()> {
        if meta.path.is_ident("capacity") {
            let lit: LitInt = meta.value()?.parse()?;
            let capacity = lit.base10_parse::<usize>()?;
            if capacity == 0 {
                return Err(Error::new(lit.span(),
                    "capacity must be at least 1"));
            }
            self.capacity = capacity;
            Ok(())
        } else {
            Err(meta.error("unsupported vtmock attribute"))
        }
    }
}

impl Default for Attrs {
    fn default() -> Self {
        Attrs { capacity: DEFAULT_CAPACITY }
    }
}

fn parse_attrs(attrs: TokenStream) -> Result<Attrs> {
    let mut output = Attrs::default();
    let parser = syn::meta::parser(|meta| output.parse_meta(meta));
    parser.parse2(attrs)?;
    Ok(output)
}

/// Build a mock from a trait definition
fn mock_from_trait(attrs: Attrs, item: ItemTrait) -> Result<Mock> {
    if item.colon_token.is_some() {
        return Err(Error::new(item.supertraits.span(),
            "#[automock] does not support supertraits.  Mock the trait \
             together with its supertraits using mock! instead"));
    }
    let name = gen_mock_ident(&item.ident);
    let trait_path = Path::from(item.ident.clone());
    let trait_ = MockTrait::new(&name, trait_path, item.unsafety,
                                &item.generics, &item.items, 0)?;
    Mock::new(attrs, Vec::new(), item.vis, name, vec![trait_], true)
}

pub(crate) fn do_automock(attrs: TokenStream, input: TokenStream)
    -> TokenStream
{
    into_tokens(parse_attrs(attrs).and_then(|attrs| {
        let item: Item = parse2(input)?;
        match item {
            Item::Trait(item_trait) => {
                mock_from_trait(attrs, item_trait)?.gen()
            },
            other => Err(Error::new(other.span(),
                "#[automock] can only be applied to traits")),
        }
    }))
}
