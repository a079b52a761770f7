//! Markbench Macros
//!
//! Procedural macros that turn an ordinary impl block into a registered
//! benchmark suite.
//!
//! ## Macros
//!
//! - `#[suite]` - Register a type and every method in the annotated impl block
//! - `#[benchmark]` - Mark a method inside a `#[suite]` impl as a benchmark

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{quote, quote_spanned};
use syn::{ImplItem, ImplItemFn, ItemImpl, parse_macro_input};

const MARKER: &str = "benchmark";

mod attr {
    use syn::meta::ParseNestedMeta;

    /// Get the attribute name as a string
    pub fn name(meta: &ParseNestedMeta) -> String {
        meta.path
            .get_ident()
            .map(|i| i.to_string())
            .unwrap_or_default()
    }

    /// Parse a string literal attribute: `attr = "value"`
    pub fn string(meta: &ParseNestedMeta) -> syn::Result<String> {
        let value: syn::LitStr = meta.value()?.parse()?;
        Ok(value.value())
    }

    /// Parse a path attribute: `attr = some::Type`
    pub fn path(meta: &ParseNestedMeta) -> syn::Result<syn::Path> {
        meta.value()?.parse()
    }

    /// Create an unknown attribute error
    pub fn unknown(meta: &ParseNestedMeta, name: &str) -> syn::Error {
        meta.error(format!("unknown attribute: {}", name))
    }
}

/// Register a suite type and the methods of this impl block
///
/// Methods tagged `#[benchmark]` become candidates for resolution. Every
/// other method is recorded too, so that resolution can tell an unmarked
/// method from a missing one.
///
/// # Example
///
/// ```ignore
/// #[suite]
/// impl Base {
///     #[benchmark(mode = "single_shot")]
///     fn warm(l: &mut Loop) -> RunResult { ... }
/// }
///
/// #[suite(extends = Base)]
/// impl Child {
///     #[benchmark]
///     fn hot_path(l: &mut Loop) -> RunResult { ... }
/// }
/// ```
///
/// Use at most one `#[suite]` impl block per type.
#[proc_macro_attribute]
pub fn suite(args: TokenStream, item: TokenStream) -> TokenStream {
    let args = TokenStream2::from(args);
    let item = parse_macro_input!(item as ItemImpl);

    suite_impl(args, item)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}

/// Mark a benchmark method
///
/// Only meaningful inside a `#[suite]` impl block, which consumes it.
///
/// ```ignore
/// #[benchmark(mode = "loop")]
/// fn run(l: &mut Loop) -> RunResult { ... }
/// ```
#[proc_macro_attribute]
pub fn benchmark(_args: TokenStream, item: TokenStream) -> TokenStream {
    let item = TokenStream2::from(item);
    quote! {
        compile_error!("#[benchmark] must be placed on a method inside a #[suite] impl block");
        #item
    }
    .into()
}

#[derive(Default)]
struct SuiteConfig {
    extends: Option<syn::Path>,
}

fn parse_suite_config(args: TokenStream2) -> Result<SuiteConfig, syn::Error> {
    let mut config = SuiteConfig::default();
    if args.is_empty() {
        return Ok(config);
    }

    let parser = syn::meta::parser(|meta| {
        let name = attr::name(&meta);
        match name.as_str() {
            "extends" => config.extends = Some(attr::path(&meta)?),
            _ => return Err(attr::unknown(&meta, &name)),
        }
        Ok(())
    });
    syn::parse::Parser::parse2(parser, args)?;
    Ok(config)
}

fn suite_impl(args: TokenStream2, mut item: ItemImpl) -> Result<TokenStream2, syn::Error> {
    let config = parse_suite_config(args)?;

    if let Some((_, path, _)) = &item.trait_ {
        return Err(syn::Error::new_spanned(
            path,
            "#[suite] goes on an inherent impl block, not a trait impl",
        ));
    }
    if !item.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &item.generics,
            "#[suite] does not support generic types",
        ));
    }

    let self_ty = item.self_ty.clone();
    let type_ident = match &*self_ty {
        syn::Type::Path(tp) => tp
            .path
            .segments
            .last()
            .map(|s| s.ident.to_string())
            .ok_or_else(|| syn::Error::new_spanned(&self_ty, "expected a type name"))?,
        other => {
            return Err(syn::Error::new_spanned(
                other,
                "#[suite] expects a plain named type",
            ));
        }
    };

    let parent = match &config.extends {
        Some(p) => quote! { Some(<#p as ::markbench::BenchSuite>::TYPE_NAME) },
        None => quote! { None },
    };

    let mut methods = Vec::new();
    for impl_item in item.items.iter_mut() {
        if let ImplItem::Fn(func) = impl_item {
            methods.push(method_def(&self_ty, func)?);
        }
    }

    Ok(quote! {
        #item

        impl ::markbench::BenchSuite for #self_ty {
            const TYPE_NAME: &'static str = concat!(module_path!(), "::", #type_ident);
        }

        ::markbench::internal::inventory::submit! {
            ::markbench::TypeDef {
                name: <#self_ty as ::markbench::BenchSuite>::TYPE_NAME,
                parent: #parent,
                file: file!(),
                line: line!(),
            }
        }

        #(#methods)*
    })
}

/// Strip the marker from `func` and emit its `MethodDef` registration
fn method_def(self_ty: &syn::Type, func: &mut ImplItemFn) -> Result<TokenStream2, syn::Error> {
    let marker = take_marker(func)?;
    let sig = &func.sig;
    let ident = &sig.ident;
    let name = ident.to_string();

    let is_marked = marker.is_some();
    if is_marked {
        let has_receiver = sig.receiver().is_some();
        if has_receiver {
            return Err(syn::Error::new_spanned(
                sig,
                "benchmark methods take no receiver: write `fn name(l: &mut Loop) -> RunResult`",
            ));
        }
        if !sig.generics.params.is_empty() || sig.asyncness.is_some() {
            return Err(syn::Error::new_spanned(
                sig,
                "benchmark methods cannot be generic or async",
            ));
        }
    }

    let params: Vec<String> = sig
        .inputs
        .iter()
        .filter_map(|arg| match arg {
            syn::FnArg::Typed(pat) => {
                let ty = &pat.ty;
                Some(quote!(#ty).to_string())
            }
            syn::FnArg::Receiver(_) => None,
        })
        .collect();

    let returns = match &sig.output {
        syn::ReturnType::Default => "()".to_string(),
        syn::ReturnType::Type(_, ty) => quote!(#ty).to_string(),
    };

    let marker_expr = match marker {
        Some(mode) => quote! { Some(#mode) },
        None => quote! { None },
    };

    // Only emit a runner when the signature coerces; otherwise the
    // resolver reports the mismatch at runtime.
    let runner = if is_marked && is_runner_shape(sig) {
        quote! {
            Some(<#self_ty>::#ident as fn(&mut ::markbench::Loop) -> ::markbench::RunResult)
        }
    } else {
        quote! { None }
    };

    let line = quote_spanned!(ident.span()=> line!());

    Ok(quote! {
        ::markbench::internal::inventory::submit! {
            ::markbench::MethodDef {
                owner: <#self_ty as ::markbench::BenchSuite>::TYPE_NAME,
                name: #name,
                marker: #marker_expr,
                returns: #returns,
                params: &[#(#params),*],
                synthetic: false,
                runner: #runner,
                file: file!(),
                line: #line,
            }
        }
    })
}

/// Remove a `#[benchmark]` attribute from `func`, returning its mode
fn take_marker(func: &mut ImplItemFn) -> Result<Option<TokenStream2>, syn::Error> {
    let Some(pos) = func.attrs.iter().position(is_marker) else {
        return Ok(None);
    };
    let attr = func.attrs.remove(pos);
    if func.attrs.iter().any(is_marker) {
        return Err(syn::Error::new_spanned(
            &func.sig.ident,
            "duplicate #[benchmark] marker",
        ));
    }

    let mut mode = quote! { ::markbench::BenchmarkType::Loop };
    if matches!(attr.meta, syn::Meta::Path(_)) {
        return Ok(Some(mode));
    }

    attr.parse_nested_meta(|meta| {
        let name = attr::name(&meta);
        match name.as_str() {
            "mode" => {
                let value = attr::string(&meta)?;
                mode = match value.as_str() {
                    "loop" => quote! { ::markbench::BenchmarkType::Loop },
                    "single_shot" | "single-shot" => {
                        quote! { ::markbench::BenchmarkType::SingleShot }
                    }
                    other => {
                        return Err(meta.error(format!(
                            "unknown benchmark mode `{}` (expected \"loop\" or \"single_shot\")",
                            other
                        )));
                    }
                };
            }
            _ => return Err(attr::unknown(&meta, &name)),
        }
        Ok(())
    })?;

    Ok(Some(mode))
}

/// `#[benchmark]` or any path ending in it, such as `#[markbench::benchmark]`
fn is_marker(attr: &syn::Attribute) -> bool {
    attr.path()
        .segments
        .last()
        .is_some_and(|segment| segment.ident == MARKER)
}

/// `fn(&mut <..>::Loop) -> <..>::RunResult`, checked structurally
fn is_runner_shape(sig: &syn::Signature) -> bool {
    if sig.inputs.len() != 1 {
        return false;
    }
    let param_ok = match sig.inputs.first() {
        Some(syn::FnArg::Typed(pat)) => match &*pat.ty {
            syn::Type::Reference(r) => r.mutability.is_some() && last_segment_is(&r.elem, "Loop"),
            _ => false,
        },
        _ => false,
    };
    let return_ok = match &sig.output {
        syn::ReturnType::Type(_, ty) => last_segment_is(ty, "RunResult"),
        syn::ReturnType::Default => false,
    };
    param_ok && return_ok
}

fn last_segment_is(ty: &syn::Type, ident: &str) -> bool {
    match ty {
        syn::Type::Path(tp) => tp
            .path
            .segments
            .last()
            .is_some_and(|s| s.ident == ident && s.arguments.is_none()),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn impl_fn(src: &str) -> ImplItemFn {
        match syn::parse_str::<ImplItem>(src).unwrap() {
            ImplItem::Fn(f) => f,
            _ => panic!("expected a method"),
        }
    }

    fn sig(src: &str) -> syn::Signature {
        let item: syn::ItemFn = syn::parse_str(&format!("{} {{}}", src)).unwrap();
        item.sig
    }

    #[test]
    fn test_runner_shape() {
        assert!(is_runner_shape(&sig("fn a(l: &mut Loop) -> RunResult")));
        assert!(is_runner_shape(&sig(
            "fn a(l: &mut markbench::Loop) -> markbench::RunResult"
        )));
        assert!(!is_runner_shape(&sig("fn a(l: &Loop) -> RunResult")));
        assert!(!is_runner_shape(&sig("fn a(l: &mut Loop) -> u64")));
        assert!(!is_runner_shape(&sig("fn a(l: &mut Loop, n: u32) -> RunResult")));
        assert!(!is_runner_shape(&sig("fn a() -> RunResult")));
    }

    #[test]
    fn test_take_marker_default_mode() {
        let mut func = impl_fn("#[benchmark] fn a(l: &mut Loop) -> RunResult { todo!() }");
        let mode = take_marker(&mut func).unwrap().unwrap();
        assert_eq!(
            mode.to_string(),
            quote! { ::markbench::BenchmarkType::Loop }.to_string()
        );
        assert!(func.attrs.is_empty());
    }

    #[test]
    fn test_take_marker_single_shot() {
        let mut func = impl_fn(
            "#[benchmark(mode = \"single_shot\")] fn a(l: &mut Loop) -> RunResult { todo!() }",
        );
        let mode = take_marker(&mut func).unwrap().unwrap();
        assert!(mode.to_string().contains("SingleShot"));
    }

    #[test]
    fn test_take_marker_rejects_unknown_mode() {
        let mut func = impl_fn(
            "#[benchmark(mode = \"throughput\")] fn a(l: &mut Loop) -> RunResult { todo!() }",
        );
        assert!(take_marker(&mut func).is_err());
    }

    #[test]
    fn test_take_marker_path_qualified() {
        let mut func = impl_fn(
            "#[markbench::benchmark(mode = \"single_shot\")] fn a(l: &mut Loop) -> RunResult { todo!() }",
        );
        let mode = take_marker(&mut func).unwrap().unwrap();
        assert!(mode.to_string().contains("SingleShot"));
        assert!(func.attrs.is_empty());
    }

    #[test]
    fn test_take_marker_rejects_mixed_duplicates() {
        let mut func = impl_fn(
            "#[benchmark] #[::markbench::benchmark] fn a(l: &mut Loop) -> RunResult { todo!() }",
        );
        assert!(take_marker(&mut func).is_err());
    }

    #[test]
    fn test_runner_shape_absolute_path_and_lifetime() {
        assert!(is_runner_shape(&sig(
            "fn a(l: &mut ::markbench::Loop) -> ::markbench::RunResult"
        )));
        assert!(is_runner_shape(&sig("fn a(l: &'_ mut Loop) -> RunResult")));
    }

    #[test]
    fn test_unmarked_method() {
        let mut func = impl_fn("fn helper(&self) -> u32 { 1 }");
        assert!(take_marker(&mut func).unwrap().is_none());
    }

    #[test]
    fn test_marked_receiver_rejected() {
        let ty: syn::Type = syn::parse_str("Suite").unwrap();
        let mut func = impl_fn(
            "#[benchmark] fn a(&self, l: &mut Loop) -> RunResult { todo!() }",
        );
        assert!(method_def(&ty, &mut func).is_err());
    }
}
