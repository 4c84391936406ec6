//! Tests for `#[morph(...)]` parsing behaviour.

use anyhow::{Result, anyhow, ensure};
use rstest::rstest;
use syn::{DeriveInput, parse_quote};

use super::*;

fn names(input: &DeriveInput) -> Result<Vec<String>> {
    let parsed = parse_input(input).map_err(|err| anyhow!(err))?;
    Ok(parsed.fields.into_iter().map(|f| f.name).collect())
}

#[test]
fn parses_struct_and_field_attributes() -> Result<()> {
    let input: DeriveInput = parse_quote! {
        #[morph(name = "Person", methods = person_methods, cloneable, crate = "sm")]
        struct Demo {
            #[morph(rename = "nickName", private)]
            nick: String,
            #[morph(embed)]
            base: Base,
            #[morph(skip)]
            cache: Vec<u8>,
            #[morph(tag(json = "age", db = "years"))]
            age: i64,
        }
    };

    let parsed = parse_input(&input).map_err(|err| anyhow!(err))?;
    ensure!(parsed.ident == "Demo", "expected Demo ident");
    ensure!(parsed.type_name() == "Person", "expected Person type name");
    ensure!(parsed.attrs.cloneable, "expected cloneable");
    ensure!(
        parsed
            .attrs
            .methods
            .as_ref()
            .is_some_and(|path| path.is_ident("person_methods")),
        "expected person_methods path"
    );
    ensure!(
        parsed
            .attrs
            .crate_path
            .as_ref()
            .is_some_and(|path| path.is_ident("sm")),
        "expected sm crate path"
    );

    let [nick, base, cache, age] = parsed.fields.as_slice() else {
        return Err(anyhow!("expected four fields"));
    };
    ensure!(nick.name == "nickName" && nick.attrs.private);
    ensure!(base.name == "Base" && base.attrs.embed);
    ensure!(cache.attrs.skip);
    ensure!(
        age.attrs.tags
            == vec![
                (String::from("json"), String::from("age")),
                (String::from("db"), String::from("years")),
            ]
    );
    Ok(())
}

#[rstest]
#[case::default(None, "NickName")]
#[case::camel(Some("camelCase"), "nickName")]
#[case::snake(Some("snake_case"), "nick_name")]
#[case::kebab(Some("kebab-case"), "nick-name")]
#[case::screaming(Some("SCREAMING_SNAKE_CASE"), "NICK_NAME")]
fn rename_all_applies_to_field_names(
    #[case] rule: Option<&str>,
    #[case] expected: &str,
) -> Result<()> {
    let input: DeriveInput = match rule {
        Some(rule) => parse_quote! {
            #[morph(rename_all = #rule)]
            struct Demo { nick_name: String }
        },
        None => parse_quote! {
            struct Demo { nick_name: String }
        },
    };
    ensure!(names(&input)? == vec![String::from(expected)]);
    Ok(())
}

#[rstest]
fn raw_identifiers_lose_their_prefix() -> Result<()> {
    let input: DeriveInput = parse_quote! {
        struct Demo { r#type: String }
    };
    ensure!(names(&input)? == vec![String::from("Type")]);
    Ok(())
}

#[rstest]
fn flags_accept_explicit_booleans() -> Result<()> {
    let input: DeriveInput = parse_quote! {
        #[morph(cloneable = false)]
        struct Demo {
            #[morph(private = false, unknown_key = "ignored")]
            value: u8,
        }
    };
    let parsed = parse_input(&input).map_err(|err| anyhow!(err))?;
    ensure!(!parsed.attrs.cloneable);
    ensure!(parsed.fields.iter().all(|f| !f.attrs.private));
    Ok(())
}

#[rstest]
#[case::tuple(parse_quote! { struct Demo(u8); }, "named fields")]
#[case::enumeration(parse_quote! { enum Demo { A } }, "only be derived for structs")]
#[case::bad_rule(
    parse_quote! { #[morph(rename_all = "Title Case")] struct Demo { a: u8 } },
    "unsupported rename_all"
)]
#[case::skip_embed(
    parse_quote! { struct Demo { #[morph(skip, embed)] a: Base } },
    "cannot be combined"
)]
#[case::non_string_rename(
    parse_quote! { struct Demo { #[morph(rename = 5)] a: u8 } },
    "rename must be a string"
)]
fn rejects_invalid_input(#[case] input: DeriveInput, #[case] message: &str) -> Result<()> {
    let Err(err) = parse_input(&input) else {
        return Err(anyhow!("expected a parse failure"));
    };
    ensure!(err.to_string().contains(message), "unexpected error: {err}");
    Ok(())
}
