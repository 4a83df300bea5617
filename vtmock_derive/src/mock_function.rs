// vim: tw=80
use super::*;

use syn::{
    spanned::Spanned,
    visit::{self, Visit},
};

/// Finds the parts of a type that a mock can't store or match against.
///
/// References inside `fn` pointers and `Fn(..)` bounds are higher-ranked and
/// don't count.
#[derive(Default)]
struct Unsupported {
    impl_trait: Option<Span>,
    reference: Option<Span>,
}

impl Unsupported {
    fn scan(ty: &Type) -> Self {
        let mut this = Self::default();
        this.visit_type(ty);
        this
    }
}

impl<'ast> Visit<'ast> for Unsupported {
    fn visit_type_impl_trait(&mut self, i: &'ast TypeImplTrait) {
        self.impl_trait.get_or_insert(i.span());
    }

    fn visit_type_reference(&mut self, i: &'ast TypeReference) {
        self.reference.get_or_insert(i.span());
        visit::visit_type_reference(self, i);
    }

    fn visit_type_bare_fn(&mut self, _i: &'ast TypeBareFn) {}

    fn visit_parenthesized_generic_arguments(&mut self,
        _i: &'ast ParenthesizedGenericArguments) {}
}

/// Everything needed to generate the code for one mocked method
pub(crate) struct MockFunction {
    /// Name of the method
    name: Ident,
    /// Name of the trait that declares the method
    trait_ident: Ident,
    /// Position of the method among all methods of the mock
    slot: usize,
    /// The signature used in the trait impl, with arguments renamed
    sig: Signature,
    /// Renamed arguments: `__a0`, `__a1`, ...
    argnames: Vec<Ident>,
    /// Argument types, as seen from the method's module
    argty: Vec<Type>,
    /// Types matched by the argument predicates, as seen from the method's
    /// module.  Reference arguments are matched through their referent.
    predty: Vec<Type>,
    /// Expressions that borrow each argument as a `&predty`
    predexprs: Vec<TokenStream>,
    /// Return type, as written in the trait
    output: Type,
    /// Return type, as seen from the method's module
    mod_output: Type,
    /// Human-readable argument and return types
    signature: String,
    /// Name of the mock struct's inherent method that adds an expectation
    expect_ident: Ident,
}

impl MockFunction {
    /// Check a trait method's signature and prepare to mock it
    pub fn new(mock: &Ident, trait_ident: &Ident, slot: usize,
               method: &TraitItemFn) -> Result<Self>
    {
        let sig = &method.sig;
        if let Some(c) = &sig.constness {
            return Err(Error::new(c.span(), "const methods can't be mocked"));
        }
        if let Some(a) = &sig.asyncness {
            return Err(Error::new(a.span(), "async methods can't be mocked"));
        }
        if let Some(abi) = &sig.abi {
            return Err(Error::new(abi.span(),
                "methods with an explicit ABI can't be mocked"));
        }
        if let Some(v) = &sig.variadic {
            return Err(Error::new(v.span(),
                "variadic methods can't be mocked"));
        }
        if !sig.generics.params.is_empty() ||
            sig.generics.where_clause.is_some()
        {
            return Err(Error::new(sig.generics.span(),
                "generic methods can't be mocked"));
        }

        let mut impl_sig = sig.clone();
        let mut argnames = Vec::new();
        let mut argty = Vec::new();
        let mut predty = Vec::new();
        let mut predexprs = Vec::new();
        let mut has_receiver = false;
        let mut typestrs = Vec::new();
        for fn_arg in impl_sig.inputs.iter_mut() {
            match fn_arg {
                FnArg::Receiver(r) => {
                    let by_ref = match &r.reference {
                        Some((_, None)) => r.colon_token.is_none(),
                        _ => false
                    };
                    if !by_ref {
                        return Err(Error::new(r.span(),
                            "mocked methods must take &self or &mut self"));
                    }
                    r.attrs.clear();
                    has_receiver = true;
                },
                FnArg::Typed(pt) => {
                    match pt.pat.as_ref() {
                        Pat::Ident(pi) if pi.by_ref.is_none() &&
                            pi.subpat.is_none() => (),
                        Pat::Wild(w) => {
                            return Err(Error::new(w.span(),
                                "Mocked methods must have named arguments"));
                        },
                        p => {
                            return Err(Error::new(p.span(),
                                "Unsupported argument pattern"));
                        }
                    }
                    let argname = format_ident!("__a{}", argnames.len());
                    let (elem, mutable) = match pt.ty.as_ref() {
                        Type::Reference(tr) => {
                            if let Some(lt) = &tr.lifetime {
                                if lt.ident != "static" {
                                    return Err(Error::new(lt.span(),
                                        "named lifetimes can't be mocked"));
                                }
                            }
                            (tr.elem.as_ref(), tr.mutability.is_some())
                        },
                        ty => (ty, false)
                    };
                    let unsupported = Unsupported::scan(elem);
                    if let Some(span) = unsupported.impl_trait {
                        return Err(Error::new(span,
                            "impl Trait arguments can't be mocked"));
                    }
                    if let Some(span) = unsupported.reference {
                        return Err(Error::new(span,
                            "Only a single top-level reference is supported \
                             in argument types"));
                    }
                    let predexpr = match pt.ty.as_ref() {
                        Type::Reference(_) if mutable => quote!(&*#argname),
                        Type::Reference(_) => quote!(#argname),
                        _ => quote!(&#argname),
                    };
                    predty.push(supersuperfy(elem, mock));
                    predexprs.push(predexpr);
                    argty.push(supersuperfy(&pt.ty, mock));
                    typestrs.push(type_string(&pt.ty));
                    pt.attrs.clear();
                    *pt.pat = Pat::Ident(PatIdent {
                        attrs: Vec::new(),
                        by_ref: None,
                        mutability: None,
                        ident: argname.clone(),
                        subpat: None
                    });
                    argnames.push(argname);
                }
            }
        }
        if !has_receiver {
            return Err(Error::new(sig.ident.span(),
                "methods without a receiver can't be mocked"));
        }

        let output = match &sig.output {
            ReturnType::Default => parse_quote!(()),
            ReturnType::Type(_, ty) => {
                match ty.as_ref() {
                    Type::Reference(_) => {
                        return Err(Error::new(ty.span(),
                            "methods returning references can't be mocked"));
                    },
                    Type::Never(_) => {
                        return Err(Error::new(ty.span(),
                            "diverging methods can't be mocked"));
                    },
                    _ => ()
                }
                let unsupported = Unsupported::scan(ty);
                if let Some(span) = unsupported.impl_trait {
                    return Err(Error::new(span,
                        "impl Trait return types can't be mocked"));
                }
                if let Some(span) = unsupported.reference {
                    return Err(Error::new(span,
                        "return types that borrow can't be mocked"));
                }
                (**ty).clone()
            }
        };
        let mut signature = format!("({})", typestrs.join(", "));
        if let ReturnType::Type(..) = &sig.output {
            signature.push_str(" -> ");
            signature.push_str(&type_string(&output));
        }

        Ok(MockFunction {
            name: sig.ident.clone(),
            trait_ident: trait_ident.clone(),
            slot,
            sig: impl_sig,
            argnames,
            argty,
            predty,
            predexprs,
            mod_output: supersuperfy(&output, mock),
            output,
            signature,
            expect_ident: format_ident!("expect_{}", sig.ident),
        })
    }

    pub fn name(&self) -> &Ident {
        &self.name
    }

    pub fn slot(&self) -> usize {
        self.slot
    }

    pub fn signature(&self) -> &str {
        &self.signature
    }

    pub fn expect_ident(&self) -> &Ident {
        &self.expect_ident
    }

    /// Prefix the expectation method with the trait's name, for mocks where
    /// two traits share a method name
    pub fn qualify_expect_ident(&mut self) {
        self.expect_ident = format_ident!("expect_{}_{}",
            snake_case(&self.trait_ident), self.name);
    }

    /// Name of this method's private module
    pub fn mod_ident(&self) -> Ident {
        format_ident!("{}_{}", self.trait_ident, self.name)
    }

    /// Path from the mock's scope to this method's private module
    fn mod_path(&self, mock: &Ident) -> TokenStream {
        let outer = gen_mod_ident(mock);
        let inner = self.mod_ident();
        quote!(#outer::#inner)
    }

    /// Path from the mock's scope to this method's identity
    pub fn id_path(&self, mock: &Ident) -> TokenStream {
        let modp = self.mod_path(mock);
        quote!(#modp::ID)
    }

    /// The method's private module: its identity, `Expectation` and matcher
    pub fn gen_module(&self) -> TokenStream {
        let mod_ident = self.mod_ident();
        let slot = self.slot;
        let interface = self.trait_ident.to_string();
        let name = self.name.to_string();
        let signature = &self.signature;
        let argnames = &self.argnames;
        let argty = &self.argty;
        let predty = &self.predty;
        let output = &self.mod_output;
        let n = argnames.len();
        let underscores = argnames.iter().map(|_| quote!(_)).collect::<Vec<_>>();

        let pred_parts = if n > 0 {
            let pnames = (0..n).map(|i| format_ident!("__p{}", i))
                .collect::<Vec<_>>();
            let ptys = (0..n).map(|i| format_ident!("__P{}", i))
                .collect::<Vec<_>>();
            let vnames = (0..n).map(|i| format_ident!("__v{}", i))
                .collect::<Vec<_>>();
            let vtys = (0..n).map(|i| format_ident!("__V{}", i))
                .collect::<Vec<_>>();
            Some((
                quote!(Pred(#(Box<dyn ::vtmock::Predicate<#predty>>),*),),
                quote!(
                    Matcher::Pred(#(#pnames),*) =>
                        true #(&& #pnames.eval(#argnames))*,
                ),
                quote!(
                    Matcher::Pred(#(#pnames),*) => {
                        let parts: [String; #n] = [#(#pnames.to_string()),*];
                        parts.join(", ")
                    },
                ),
                quote!(
                    Matcher::Pred(#(#pnames),*) => {
                        let parts: [Option<String>; #n] = [#(
                            #pnames.find_case(false, #argnames)
                                .map(|case| case.tree().to_string())
                        ),*];
                        let why = parts.iter()
                            .flatten()
                            .cloned()
                            .collect::<Vec<_>>();
                        if why.is_empty() {
                            None
                        } else {
                            Some(why.join("; "))
                        }
                    },
                ),
                quote!(
                    /// Match each argument against a `Predicate`
                    pub fn with<#(#ptys),*>(&mut self, #(#pnames: #ptys),*)
                        -> &mut Self
                        where #(#ptys: ::vtmock::Predicate<#predty> + 'static),*
                    {
                        self.matcher = Matcher::Pred(#(Box::new(#pnames)),*);
                        self
                    }

                    /// Match each argument by equality
                    pub fn with_values<#(#vtys),*>(&mut self,
                                                  #(#vnames: #vtys),*)
                        -> &mut Self
                        where #(
                            #vtys: ::std::fmt::Debug + ::std::cmp::PartialEq
                                + 'static,
                            ::vtmock::__private::EqPredicate<#vtys>:
                                ::vtmock::Predicate<#predty>,
                        )*
                    {
                        self.with(#(::vtmock::predicate::eq(#vnames)),*)
                    }
                ),
            ))
        } else {
            None
        };
        let (pred_variant, pred_matches, pred_describe, pred_explain,
             pred_builders) = match pred_parts {
            Some(parts) => parts,
            None => Default::default()
        };

        quote!(
            pub mod #mod_ident {
                #[allow(unused_imports)]
                use super::*;
                #[allow(unused_imports)]
                use ::vtmock::Predicate as _;
                #[allow(unused_imports)]
                use ::vtmock::__private::{
                    CaseTreeExt as _,
                    NoDefault as _,
                    ViaDefault as _
                };

                pub const ID: ::vtmock::MethodId = ::vtmock::MethodId::new(
                    #slot, #interface, #name, #signature);

                enum Matcher {
                    Always,
                    Func(Box<dyn Fn(#(&#predty),*) -> bool>),
                    #pred_variant
                }

                /// Expectation of one call signature: which arguments it
                /// accepts, how often, and what it returns
                pub struct Expectation {
                    times: ::vtmock::Times,
                    matcher: Matcher,
                    actions: ::vtmock::Actions<dyn FnMut(#(#argty),*) -> #output>,
                }

                impl Expectation {
                    /// Does the matcher accept these arguments?
                    pub fn matches(&self, #(#argnames: &#predty),*) -> bool {
                        match &self.matcher {
                            Matcher::Always => true,
                            Matcher::Func(f) => f(#(#argnames),*),
                            #pred_matches
                        }
                    }

                    /// Why the matcher rejects these arguments, if it does
                    pub fn explain(&self, #(#argnames: &#predty),*)
                        -> Option<String>
                    {
                        match &self.matcher {
                            Matcher::Always => None,
                            Matcher::Func(f) => {
                                if f(#(#argnames),*) {
                                    None
                                } else {
                                    Some(String::from("<function> returned false"))
                                }
                            },
                            #pred_explain
                        }
                    }

                    /// Run the scripted action for this call, or return the
                    /// default value
                    pub fn call(&mut self, #(#argnames: #argty),*) -> #output {
                        let n = self.times.call();
                        match self.actions.pick(n) {
                            Some(f) => f(#(#argnames),*),
                            None => {
                                (&::vtmock::__private::DefaultReturner::<#output>::new())
                                    .maybe_default()
                                    .unwrap_or_else(|| {
                                        ::vtmock::__private::no_default(ID,
                                            ::vtmock::__private::type_name::<#output>())
                                    })
                            }
                        }
                    }

                    #pred_builders

                    /// Match the arguments with a single function
                    pub fn withf<__F>(&mut self, f: __F) -> &mut Self
                        where __F: Fn(#(&#predty),*) -> bool + 'static
                    {
                        self.matcher = Matcher::Func(Box::new(f));
                        self
                    }

                    /// Require exactly `n` calls
                    pub fn times(&mut self, n: usize) -> &mut Self {
                        self.times.n(n);
                        self
                    }

                    /// Require exactly one call.  This is the default.
                    pub fn once(&mut self) -> &mut Self {
                        self.times(1)
                    }

                    /// Forbid any call
                    pub fn never(&mut self) -> &mut Self {
                        self.times.never();
                        self
                    }

                    /// Require a number of calls within the half-open range
                    pub fn times_range(&mut self, range: ::std::ops::Range<usize>)
                        -> &mut Self
                    {
                        self.times.range(range);
                        self
                    }

                    pub fn at_least(&mut self, n: usize) -> &mut Self {
                        self.times.at_least(n);
                        self
                    }

                    pub fn at_most(&mut self, n: usize) -> &mut Self {
                        self.times.at_most(n);
                        self
                    }

                    /// Allow any number of calls, including none
                    pub fn times_any(&mut self) -> &mut Self {
                        self.times.any();
                        self
                    }

                    /// Append an action that computes the return value from
                    /// the arguments
                    pub fn returning<__F>(&mut self, f: __F) -> &mut Self
                        where __F: FnMut(#(#argty),*) -> #output + 'static
                    {
                        self.actions.push(Box::new(f));
                        self
                    }

                    /// Append an action that returns a clone of `value`
                    pub fn return_const<__V>(&mut self, value: __V) -> &mut Self
                        where __V: Clone + Into<#output> + 'static
                    {
                        self.returning(move |#(#underscores),*| value.clone().into())
                    }
                }

                impl Default for Expectation {
                    fn default() -> Self {
                        Expectation {
                            times: ::vtmock::Times::default(),
                            matcher: Matcher::Always,
                            actions: ::vtmock::Actions::default(),
                        }
                    }
                }

                impl ::vtmock::Expect for Expectation {
                    fn cardinality(&self) -> &::vtmock::Times {
                        &self.times
                    }

                    fn describe(&self) -> String {
                        match &self.matcher {
                            Matcher::Always => String::from("<anything>"),
                            Matcher::Func(_) => String::from("<function>"),
                            #pred_describe
                        }
                    }
                }
            }
        )
    }

    /// The mock struct's inherent `expect_*` method
    pub fn gen_expect_method(&self, mock: &Ident) -> TokenStream {
        let modp = self.mod_path(mock);
        let expect_ident = &self.expect_ident;
        let doc = format!("Add an expectation for `{}::{}`",
            self.trait_ident, self.name);
        quote!(
            #[doc = #doc]
            pub fn #expect_ident(&mut self) -> &mut #modp::Expectation {
                self.__vtmock.expect::<#modp::Expectation>(#modp::ID)
            }
        )
    }

    /// The zero-sized type that selects this method
    pub fn gen_marker(&self) -> TokenStream {
        let name = &self.name;
        let doc = format!("Selects `{}::{}`", self.trait_ident, self.name);
        quote!(
            #[doc = #doc]
            #[derive(Clone, Copy, Debug, Default)]
            pub struct #name;
        )
    }

    /// Bind the marker to its mock, expectation type and identity
    pub fn gen_method_impl(&self, mock: &Ident) -> TokenStream {
        let methods = gen_methods_ident(mock);
        let trait_ident = &self.trait_ident;
        let name = &self.name;
        let modp = self.mod_path(mock);
        quote!(
            impl ::vtmock::Method for #methods::#trait_ident::#name {
                type Mock = #mock;
                type Expectation = #modp::Expectation;
                const ID: ::vtmock::MethodId = #modp::ID;
            }
        )
    }

    /// The method in the mock's trait impl, which routes the call through
    /// the recorder
    pub fn gen_impl_method(&self, mock: &Ident) -> TokenStream {
        let modp = self.mod_path(mock);
        let sig = &self.sig;
        let argnames = &self.argnames;
        let predexprs = &self.predexprs;
        let output = &self.output;
        quote!(
            #sig {
                #[allow(unused_imports)]
                use ::vtmock::__private::{
                    NoDebug as _,
                    NoDefault as _,
                    ViaDebug as _,
                    ViaDefault as _
                };
                let __recorder = &self.__vtmock;
                match __recorder.find::<#modp::Expectation, _>(#modp::ID,
                    |__e| __e.matches(#(#predexprs),*))
                {
                    Some(mut __slot) => __slot.call(#(#argnames),*),
                    None => {
                        let __args = ::std::vec![#(
                            (&::vtmock::__private::ArgFmt(&#argnames)).describe()
                        ),*];
                        let __why = __recorder.explain::<#modp::Expectation, _>(
                            #modp::ID,
                            |__e| __e.explain(#(#predexprs),*));
                        __recorder.unexpected(#modp::ID, __args, __why,
                            (&::vtmock::__private::DefaultReturner::<#output>::new())
                                .maybe_default())
                    }
                }
            }
        )
    }
}

#[cfg(test)]
mod t {
    use super::*;
    use pretty_assertions::assert_eq;

    fn build(method: TokenStream) -> Result<MockFunction> {
        let method: TraitItemFn = parse2(method).unwrap();
        MockFunction::new(&format_ident!("MockFoo"), &format_ident!("Foo"), 3,
                          &method)
    }

    fn check_error(method: TokenStream, expected: &str) {
        let e = build(method).err().expect("should have failed");
        assert_eq!(expected, e.to_string());
    }

    #[test]
    fn signature() {
        let mf = build(quote!(fn f(&self, x: &str, y: &mut Vec<u8>) -> bool;))
            .unwrap();
        assert_eq!("(&str, &mut Vec<u8>) -> bool", mf.signature());
        assert_eq!(3, mf.slot());
        assert_eq!("expect_f", mf.expect_ident().to_string());
    }

    #[test]
    fn signature_without_output() {
        let mf = build(quote!(fn f(&mut self);)).unwrap();
        assert_eq!("()", mf.signature());
    }

    #[test]
    fn predicate_types() {
        let mf = build(quote!(fn f(&self, x: &str, y: &mut u32, z: u64);))
            .unwrap();
        let expected: Vec<Type> = vec![parse_quote!(str),
                                       parse_quote!(u32),
                                       parse_quote!(u64)];
        assert_eq!(expected, mf.predty);
        let predexprs = mf.predexprs.iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>();
        assert_eq!(vec!["__a0", "& * __a1", "& __a2"], predexprs);
    }

    #[test]
    fn renames_arguments() {
        let mf = build(quote!(fn f(&self, mut x: u32);)).unwrap();
        let expected: Signature = parse_quote!(fn f(&self, __a0: u32));
        assert_eq!(expected, mf.sig);
    }

    #[test]
    fn qualified_expect_ident() {
        let mut mf = build(quote!(fn put(&self, x: u32);)).unwrap();
        mf.qualify_expect_ident();
        assert_eq!("expect_foo_put", mf.expect_ident().to_string());
        assert_eq!("Foo_put", mf.mod_ident().to_string());
    }

    #[test]
    fn async_fn() {
        check_error(quote!(async fn f(&self);), "async methods can't be mocked");
    }

    #[test]
    fn by_value_self() {
        check_error(quote!(fn f(self);),
            "mocked methods must take &self or &mut self");
    }

    #[test]
    fn generic_method() {
        check_error(quote!(fn f<T>(&self, t: T);),
            "generic methods can't be mocked");
    }

    #[test]
    fn impl_trait_arg() {
        check_error(quote!(fn f(&self, t: impl Clone);),
            "impl Trait arguments can't be mocked");
    }

    #[test]
    fn nested_reference() {
        check_error(quote!(fn f(&self, t: Option<&u32>);),
            "Only a single top-level reference is supported in argument types");
    }

    #[test]
    fn fn_pointer_argument() {
        build(quote!(fn f(&self, cb: fn(&str) -> bool);)).unwrap();
    }

    #[test]
    fn reference_return() {
        check_error(quote!(fn f(&self) -> &u32;),
            "methods returning references can't be mocked");
    }

    #[test]
    fn static_method() {
        check_error(quote!(fn f(x: u32);),
            "methods without a receiver can't be mocked");
    }

    #[test]
    fn wildcard_argument() {
        check_error(quote!(fn f(&self, _: u32);),
            "Mocked methods must have named arguments");
    }
}
