use anyhow::Context;
use quote::ToTokens;
use std::path::Path;
use syn::parse::{Parse, ParseStream};
use syn::punctuated::Punctuated;
use syn::{Attribute, Expr, ExprLit, Ident, ImplItem, Item, Lit, Meta, ReturnType, Signature, Token, TraitItem, Type};
use walkdir::{DirEntry, WalkDir};

use crate::model::{is_name_segment, qualify};
use crate::scan::{Declaration, Marker, MarkerKind, Round};

/// Scan a Rust source file or directory tree for marked declarations.
///
/// Directories are walked in file-name order so the round is stable across
/// runs. `target/` and hidden directories are skipped.
///
/// # Errors
///
/// Returns an error if a file cannot be read, does not parse as Rust, or
/// carries a marker with malformed arguments.
pub fn scan_source_tree(root: &Path, root_package: Option<&str>) -> anyhow::Result<Round> {
    let mut declarations = Vec::new();
    if root.is_file() {
        let base = root.parent().unwrap_or_else(|| Path::new(""));
        scan_file(base, root, root_package, &mut declarations)?;
    } else if root.is_dir() {
        let walker = WalkDir::new(root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !is_skipped_dir(e));
        for entry in walker {
            let entry = entry.with_context(|| format!("Failed to walk {}", root.display()))?;
            let path = entry.path();
            if entry.file_type().is_file() && path.extension().is_some_and(|ext| ext == "rs") {
                scan_file(root, path, root_package, &mut declarations)?;
            }
        }
    } else {
        anyhow::bail!("Source path not found: {}", root.display());
    }
    tracing::debug!(
        root = %root.display(),
        declarations = declarations.len(),
        "scanned source tree"
    );
    Ok(Round::new(declarations))
}

fn is_skipped_dir(entry: &DirEntry) -> bool {
    entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| name == "target" || name.starts_with('.'))
}

fn scan_file(
    base: &Path,
    file: &Path,
    root_package: Option<&str>,
    declarations: &mut Vec<Declaration>,
) -> anyhow::Result<()> {
    let content = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read source: {}", file.display()))?;
    let parsed = syn::parse_file(&content)
        .with_context(|| format!("Failed to parse source: {}", file.display()))?;

    let mut package: Vec<String> = root_package
        .into_iter()
        .flat_map(|p| p.split('.'))
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();
    package.extend(module_path(base, file));

    let before = declarations.len();
    collect_items(&parsed.items, &package, declarations)
        .with_context(|| format!("Invalid marker in {}", file.display()))?;

    if declarations.len() > before {
        if let Some(segment) = package.iter().find(|s| !is_name_segment(s)) {
            anyhow::bail!(
                "Cannot derive a package for markers in {}: '{segment}' is not a valid package segment",
                file.display()
            );
        }
    }
    Ok(())
}

/// Module segments implied by a file's location under `base`.
///
/// `lib.rs`, `main.rs` and `mod.rs` name their directory's module and add no
/// segment of their own.
pub fn module_path(base: &Path, file: &Path) -> Vec<String> {
    let relative = file.strip_prefix(base).unwrap_or(file);
    let mut segments: Vec<String> = relative
        .parent()
        .into_iter()
        .flat_map(|p| p.components())
        .filter_map(|c| c.as_os_str().to_str())
        .filter(|s| !s.is_empty() && *s != ".")
        .map(str::to_string)
        .collect();
    if let Some(stem) = relative.file_stem().and_then(|s| s.to_str()) {
        if !matches!(stem, "lib" | "main" | "mod") {
            segments.push(stem.to_string());
        }
    }
    segments
}

fn collect_items(
    items: &[Item],
    package: &[String],
    declarations: &mut Vec<Declaration>,
) -> syn::Result<()> {
    let package_name = package.join(".");
    for item in items {
        match item {
            Item::Struct(s) => push_type(&s.attrs, &s.ident, &package_name, declarations)?,
            Item::Enum(e) => push_type(&e.attrs, &e.ident, &package_name, declarations)?,
            Item::Trait(t) => {
                push_type(&t.attrs, &t.ident, &package_name, declarations)?;
                let owner = qualify(&package_name, &t.ident.to_string());
                for trait_item in &t.items {
                    if let TraitItem::Fn(f) = trait_item {
                        push_fn(&f.attrs, &f.sig, &owner, declarations)?;
                    }
                }
            }
            Item::Impl(imp) => {
                let Some(owner) = impl_owner(&imp.self_ty) else {
                    continue;
                };
                let owner = qualify(&package_name, &owner.to_string());
                for impl_item in &imp.items {
                    if let ImplItem::Fn(f) = impl_item {
                        push_fn(&f.attrs, &f.sig, &owner, declarations)?;
                    }
                }
            }
            Item::Fn(f) => push_fn(&f.attrs, &f.sig, &package_name, declarations)?,
            Item::Mod(m) => {
                if let Some((_, nested_items)) = &m.content {
                    let mut nested = package.to_vec();
                    nested.push(m.ident.to_string());
                    collect_items(nested_items, &nested, declarations)?;
                }
            }
            _ => {}
        }
    }
    Ok(())
}

fn impl_owner(self_ty: &Type) -> Option<&Ident> {
    match self_ty {
        Type::Path(type_path) => type_path.path.segments.last().map(|s| &s.ident),
        _ => None,
    }
}

fn push_type(
    attrs: &[Attribute],
    ident: &Ident,
    package_name: &str,
    declarations: &mut Vec<Declaration>,
) -> syn::Result<()> {
    let markers = parse_markers(attrs)?;
    if !markers.is_empty() {
        declarations.push(Declaration {
            name: qualify(package_name, &ident.to_string()),
            markers,
            declared_type: None,
        });
    }
    Ok(())
}

fn push_fn(
    attrs: &[Attribute],
    sig: &Signature,
    owner: &str,
    declarations: &mut Vec<Declaration>,
) -> syn::Result<()> {
    let markers = parse_markers(attrs)?;
    if !markers.is_empty() {
        let declared_type = match &sig.output {
            ReturnType::Default => "()".to_string(),
            ReturnType::Type(_, ty) => type_string(ty),
        };
        declarations.push(Declaration {
            name: qualify(owner, &sig.ident.to_string()),
            markers,
            declared_type: Some(declared_type),
        });
    }
    Ok(())
}

/// Markers among `attrs`, matched on the last segment of the attribute path.
pub fn parse_markers(attrs: &[Attribute]) -> syn::Result<Vec<Marker>> {
    let mut markers = Vec::new();
    for attr in attrs {
        let Some(kind) = attr
            .path()
            .segments
            .last()
            .and_then(|s| MarkerKind::from_attribute(&s.ident.to_string()))
        else {
            continue;
        };
        let mut marker = Marker::new(kind);
        match &attr.meta {
            Meta::Path(_) => {}
            Meta::List(_) => {
                let args = attr.parse_args_with(Punctuated::<MarkerArg, Token![,]>::parse_terminated)?;
                for arg in args {
                    match arg {
                        MarkerArg::Positional(values) => marker.value.extend(values),
                        MarkerArg::Named { name, value } => {
                            if name == "path" {
                                marker.path.extend(string_list(&value)?);
                            } else if name == "value" {
                                marker.value.extend(string_list(&value)?);
                            }
                        }
                    }
                }
            }
            Meta::NameValue(name_value) => marker.value.extend(string_list(&name_value.value)?),
        }
        markers.push(marker);
    }
    Ok(markers)
}

enum MarkerArg {
    Positional(Vec<String>),
    Named { name: Ident, value: Expr },
}

impl Parse for MarkerArg {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        if input.peek(Ident) && input.peek2(Token![=]) {
            let name: Ident = input.parse()?;
            input.parse::<Token![=]>()?;
            let value: Expr = input.parse()?;
            Ok(MarkerArg::Named { name, value })
        } else {
            let value: Expr = input.parse()?;
            Ok(MarkerArg::Positional(string_list(&value)?))
        }
    }
}

fn string_list(expr: &Expr) -> syn::Result<Vec<String>> {
    match expr {
        Expr::Lit(ExprLit {
            lit: Lit::Str(s), ..
        }) => Ok(vec![s.value()]),
        Expr::Array(array) => array
            .elems
            .iter()
            .map(|elem| match elem {
                Expr::Lit(ExprLit {
                    lit: Lit::Str(s), ..
                }) => Ok(s.value()),
                other => Err(syn::Error::new_spanned(other, "expected a string literal")),
            })
            .collect(),
        other => Err(syn::Error::new_spanned(
            other,
            "expected a string literal or an array of string literals",
        )),
    }
}

/// Render a type the way it is written, without the token stream's spacing.
pub fn type_string(ty: &Type) -> String {
    compact_tokens(&ty.to_token_stream().to_string())
}

fn compact_tokens(tokens: &str) -> String {
    let is_word = |c: char| c.is_alphanumeric() || c == '_' || c == '\'';
    let mut out = String::with_capacity(tokens.len());
    let mut chars = tokens.chars().peekable();
    let mut prev: Option<char> = None;
    while let Some(c) = chars.next() {
        if c == ' ' {
            let keep = matches!(
                (prev, chars.peek()),
                (Some(p), Some(&n)) if is_word(p) && is_word(n)
            );
            if keep {
                out.push(' ');
            }
            continue;
        }
        out.push(c);
        if c == ',' {
            out.push(' ');
        }
        prev = Some(c);
    }
    out.trim_end().to_string()
}
