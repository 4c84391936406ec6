//! Unit tests for the cloner.

use std::rc::Rc;

use anyhow::{Result, bail, ensure};
use rstest::{fixture, rstest};

use super::*;
use crate::equal::equal;
use crate::value::{
    FieldDescriptor, FloatKind, FuncType, IntKind, MapValue, MethodBody, MethodDescriptor,
    Pointer, SequenceValue, StructType, StructValue, Type,
};

fn string(s: &str) -> Value {
    Value::String(s.to_owned())
}

fn int(v: i64) -> Value {
    Value::Int(v, IntKind::I64)
}

fn strings(items: &[&str]) -> Value {
    Value::Sequence(SequenceValue::slice(
        Type::String.into(),
        items.iter().map(|s| string(s)).collect(),
    ))
}

fn double_age() -> MethodDescriptor {
    let body: MethodBody = Rc::new(|receiver: &mut StructValue, _args: &[Value]| {
        match receiver.field("Age") {
            Some(Value::Int(age, _)) => Ok(vec![int(age * 2)]),
            _ => Err(String::from("no age")),
        }
    });
    MethodDescriptor::new(
        "DoubleAge",
        FuncType::new(Vec::new(), vec![Type::Int(IntKind::I64)]),
        body,
    )
}

fn role_setter() -> MethodDescriptor {
    let body: MethodBody = Rc::new(|receiver: &mut StructValue, args: &[Value]| {
        let Some(Value::String(role)) = args.first() else {
            return Err(String::from("role must be a string"));
        };
        if let Some(slot) = receiver.field_mut("RoleName") {
            *slot = Value::String(format!("Super {role}"));
        }
        Ok(Vec::new())
    });
    MethodDescriptor::new("Role", FuncType::new(vec![Type::String], Vec::new()), body)
}

#[fixture]
fn user() -> Rc<StructType> {
    StructType::builder("User")
        .field(FieldDescriptor::new("Name", Type::String))
        .field(FieldDescriptor::new("Age", Type::Int(IntKind::I8)))
        .field(FieldDescriptor::new("Weight", Type::Float(FloatKind::F32)))
        .field(FieldDescriptor::new("Tags", Type::slice_of(Type::String)))
        .field(FieldDescriptor::new("Role", Type::String))
        .field(FieldDescriptor::new("nickName", Type::String))
        .field(FieldDescriptor::new("Birthday", Type::pointer_to(Type::String)))
        .field(FieldDescriptor::new("secret", Type::String).private())
        .method(double_age())
        .build()
}

#[fixture]
fn employee() -> Rc<StructType> {
    StructType::builder("Employee")
        .field(FieldDescriptor::new("Name", Type::String))
        .field(FieldDescriptor::new("Age", Type::Int(IntKind::I64)))
        .field(FieldDescriptor::new("Weight", Type::Float(FloatKind::F64)))
        .field(FieldDescriptor::new("Tags", Type::slice_of(Type::String)))
        .field(FieldDescriptor::new("RoleName", Type::String))
        .field(FieldDescriptor::new("NickName", Type::String))
        .field(FieldDescriptor::new("Birthday", Type::pointer_to(Type::String)))
        .field(FieldDescriptor::new("DoubleAge", Type::Int(IntKind::I64)))
        .field(FieldDescriptor::new("secret", Type::String).private())
        .method(role_setter())
        .build()
}

fn ada(user: &Rc<StructType>) -> StructValue {
    StructValue::zero(user.clone())
        .with("Name", string("Ada"))
        .with("Age", Value::Int(21, IntKind::I8))
        .with("Weight", Value::Float(f64::from(0.1_f32), FloatKind::F32))
        .with("Tags", strings(&["a", "b"]))
        .with("Role", string("admin"))
        .with("nickName", string("countess"))
        .with("Birthday", Value::pointer_to(string("1815-12-10")))
        .with("secret", string("s"))
}

fn copied(target: &Value) -> Result<StructValue> {
    match target.indirect_recursive() {
        Some(Value::Struct(sv)) => Ok(sv),
        other => bail!("expected a struct, found {other:?}"),
    }
}

fn is(found: Option<&Value>, expected: &Value) -> bool {
    found.is_some_and(|found| equal(found, expected))
}

#[rstest]
fn struct_copy_widens_and_promotes_methods(
    user: Rc<StructType>,
    employee: Rc<StructType>,
) -> Result<()> {
    let target = Value::pointer_to(Value::Struct(StructValue::zero(employee)));
    copy(&Value::Struct(ada(&user)), &target, &CopyConfig::default())?;

    let out = copied(&target)?;
    ensure!(is(out.field("Name"), &string("Ada")));
    ensure!(is(out.field("Age"), &int(21)));
    ensure!(is(
        out.field("Weight"),
        &Value::Float(f64::from(0.1_f32), FloatKind::F64)
    ));
    ensure!(is(out.field("Tags"), &strings(&["a", "b"])));
    ensure!(is(out.field("NickName"), &string("countess")));
    ensure!(is(out.field("DoubleAge"), &int(42)));
    ensure!(is(out.field("RoleName"), &string("Super admin")));
    ensure!(is(out.field("secret"), &string("")));
    let birthday = out.field("Birthday").and_then(Value::indirect_recursive);
    ensure!(birthday.is_some_and(|b| equal(&b, &string("1815-12-10"))));
    Ok(())
}

#[rstest]
#[case::table(CopyConfig::new().with_name_mappings([("Name", "NickName")]), "NickName")]
#[case::rule_before_table(
    CopyConfig::new()
        .with_name_mappings([("Name", "NickName")])
        .with_name_rule(|name| (name == "Name").then(|| String::from("RoleName"))),
    "RoleName"
)]
fn names_are_remapped(
    employee: Rc<StructType>,
    #[case] config: CopyConfig,
    #[case] field: &str,
) -> Result<()> {
    let named = StructType::builder("Named")
        .field(FieldDescriptor::new("Name", Type::String))
        .build();
    let source = StructValue::zero(named).with("Name", string("Ada"));
    let target = Value::pointer_to(Value::Struct(StructValue::zero(employee)));
    copy(&Value::Struct(source), &target, &config)?;
    ensure!(is(copied(&target)?.field(field), &string("Ada")));
    Ok(())
}

#[rstest]
fn ignored_names_are_skipped(user: Rc<StructType>, employee: Rc<StructType>) -> Result<()> {
    let target = Value::pointer_to(Value::Struct(StructValue::zero(employee)));
    let config = CopyConfig::new().with_ignored_names(["Name", "DoubleAge"]);
    copy(&Value::Struct(ada(&user)), &target, &config)?;
    let out = copied(&target)?;
    ensure!(is(out.field("Name"), &string("")));
    ensure!(is(out.field("DoubleAge"), &int(0)));
    ensure!(is(out.field("Age"), &int(21)));
    Ok(())
}

#[rstest]
#[case::zero_copied(CopyConfig::new(), "", true)]
#[case::zero_kept(CopyConfig::new().with_keep_if_from_is_nil_or_zero(false, true), "kept", true)]
#[case::nil_kept(CopyConfig::new().with_keep_if_from_is_nil_or_zero(true, false), "", false)]
#[case::always(
    CopyConfig::new()
        .with_keep_if_from_is_nil_or_zero(true, true)
        .with_each_field_always(true),
    "",
    true
)]
fn nil_and_zero_policies(
    user: Rc<StructType>,
    employee: Rc<StructType>,
    #[case] config: CopyConfig,
    #[case] name: &str,
    #[case] birthday_cleared: bool,
) -> Result<()> {
    let source = StructValue::zero(user).with("Role", string("x"));
    let existing = StructValue::zero(employee)
        .with("Name", string("kept"))
        .with("Birthday", Value::pointer_to(string("today")));
    let target = Value::pointer_to(Value::Struct(existing));
    copy(&Value::Struct(source), &target, &config)?;

    let out = copied(&target)?;
    ensure!(is(out.field("Name"), &string(name)));
    ensure!(out.field("Birthday").is_some_and(Value::is_nil) == birthday_cleared);
    Ok(())
}

#[rstest]
#[case("same", "")]
#[case("other", "same")]
fn zero_if_equals_from(
    user: Rc<StructType>,
    employee: Rc<StructType>,
    #[case] existing: &str,
    #[case] expected: &str,
) -> Result<()> {
    let source = StructValue::zero(user).with("Name", string("same"));
    let target = Value::pointer_to(Value::Struct(
        StructValue::zero(employee).with("Name", string(existing)),
    ));
    let config = CopyConfig::new().with_zero_if_equals_from(true);
    copy(&Value::Struct(source), &target, &config)?;
    ensure!(is(copied(&target)?.field("Name"), &string(expected)));
    Ok(())
}

#[rstest]
fn private_fields_fail_when_strict(user: Rc<StructType>, employee: Rc<StructType>) {
    let target = Value::pointer_to(Value::Struct(StructValue::zero(employee)));
    let config = CopyConfig::new().with_ignore_unexported_error(false);
    let result = copy(&Value::Struct(ada(&user)), &target, &config);
    assert!(matches!(result, Err(MorphError::FieldNotSettable { .. })));
}

#[rstest]
fn visibility_override_writes_private_fields(
    user: Rc<StructType>,
    employee: Rc<StructType>,
) -> Result<()> {
    let target = Value::pointer_to(Value::Struct(StructValue::zero(employee)));
    let config = CopyConfig::new().with_visibility_override(true);
    copy(&Value::Struct(ada(&user)), &target, &config)?;
    ensure!(is(copied(&target)?.field("secret"), &string("s")));
    Ok(())
}

fn base() -> Rc<StructType> {
    StructType::builder("Base")
        .field(FieldDescriptor::new("F1", Type::String))
        .field(FieldDescriptor::new("F2", Type::Int(IntKind::I64)))
        .build()
}

fn manager() -> Rc<StructType> {
    StructType::builder("Manager")
        .field(FieldDescriptor::new("Base", Type::Struct(base())).embedded())
        .field(FieldDescriptor::new("Title", Type::String))
        .build()
}

fn boss() -> StructValue {
    let inner = StructValue::zero(base())
        .with("F1", string("one"))
        .with("F2", int(2));
    StructValue::zero(manager())
        .with("Base", Value::Struct(inner))
        .with("Title", string("cto"))
}

#[rstest]
fn embedded_fields_flatten() -> Result<()> {
    let flat = StructType::builder("Flat")
        .field(FieldDescriptor::new("F1", Type::String))
        .field(FieldDescriptor::new("F2", Type::Int(IntKind::I64)))
        .field(FieldDescriptor::new("Title", Type::String))
        .build();
    let target = Value::pointer_to(Value::Struct(StructValue::zero(flat)));
    copy(&Value::Struct(boss()), &target, &CopyConfig::default())?;
    let out = copied(&target)?;
    ensure!(is(out.field("F1"), &string("one")));
    ensure!(is(out.field("F2"), &int(2)));
    ensure!(is(out.field("Title"), &string("cto")));
    Ok(())
}

#[rstest]
fn round_trip_preserves_structure() -> Result<()> {
    let original = Value::Struct(boss());
    let middle = Value::pointer_to(Value::Struct(StructValue::zero(manager())));
    let last = Value::pointer_to(Value::Struct(StructValue::zero(manager())));
    copy(&original, &middle, &CopyConfig::default())?;
    copy(&middle, &last, &CopyConfig::default())?;
    ensure!(equal(&Value::Struct(copied(&last)?), &original));
    Ok(())
}

#[rstest]
#[case::empty(0, 1)]
#[case::overwrites_first(2, 2)]
fn struct_into_slice(#[case] existing: usize, #[case] len: usize) -> Result<()> {
    let point = StructType::builder("Point")
        .field(FieldDescriptor::new("X", Type::Int(IntKind::I64)))
        .build();
    let stale = Value::Struct(StructValue::zero(point.clone()).with("X", int(9)));
    let source = Value::Struct(StructValue::zero(point.clone()).with("X", int(5)));
    let target = Value::pointer_to(Value::Sequence(SequenceValue::slice(
        Type::Struct(point).into(),
        vec![stale.clone(); existing],
    )));
    copy(&source, &target, &CopyConfig::default())?;

    let Some(Value::Sequence(seq)) = target.indirect_recursive() else {
        bail!("target is not a sequence");
    };
    ensure!(seq.len() == len);
    ensure!(is(seq.items().first(), &source));
    ensure!(seq.items().iter().skip(1).all(|item| equal(item, &stale)));
    Ok(())
}

#[rstest]
fn struct_into_map_is_unsupported(user: Rc<StructType>) {
    let target = Value::pointer_to(Value::Map(MapValue::new(
        Type::String.into(),
        Type::Interface.into(),
    )));
    let result = copy(&Value::Struct(ada(&user)), &target, &CopyConfig::default());
    assert!(matches!(result, Err(MorphError::UnsupportedShape { .. })));
}

#[rstest]
fn map_into_struct_aggregates_failures(employee: Rc<StructType>) -> Result<()> {
    let mut source = MapValue::new(Type::String.into(), Type::Interface.into());
    source.insert(string("name"), Value::interface(string("Ada")));
    source.insert(string("missing"), Value::interface(int(1)));
    source.insert(string("secret"), Value::interface(string("s")));
    source.insert(string("Age"), Value::interface(int(30)));
    let target = Value::pointer_to(Value::Struct(StructValue::zero(employee)));

    let causes = match copy(&Value::Map(source), &target, &CopyConfig::default()) {
        Err(MorphError::Aggregate(causes)) => causes,
        other => bail!("expected aggregated errors, got {other:?}"),
    };
    let kinds: Vec<_> = causes
        .iter()
        .map(|cause| match cause {
            MorphError::FieldNotFound { field, .. } => format!("missing {field}"),
            MorphError::FieldNotSettable { field, .. } => format!("private {field}"),
            other => other.to_string(),
        })
        .collect();
    ensure!(kinds == ["missing missing", "private secret"], "got {kinds:?}");

    let out = copied(&target)?;
    ensure!(is(out.field("Name"), &string("Ada")));
    ensure!(is(out.field("Age"), &int(30)));
    Ok(())
}

#[rstest]
fn map_into_map_converts_entries() -> Result<()> {
    let mut source = MapValue::new(Type::String.into(), Type::Int(IntKind::I8).into());
    source.insert(string("a"), Value::Int(1, IntKind::I8));
    source.insert(string("b"), Value::Int(-2, IntKind::I8));
    let mut existing = MapValue::new(Type::String.into(), Type::Int(IntKind::I64).into());
    existing.insert(string("c"), int(3));
    let target = Value::pointer_to(Value::Map(existing));
    copy(&Value::Map(source), &target, &CopyConfig::default())?;

    let Some(Value::Map(out)) = target.indirect_recursive() else {
        bail!("target is not a map");
    };
    ensure!(is(out.get_str("a"), &int(1)));
    ensure!(is(out.get_str("b"), &int(-2)));
    ensure!(is(out.get_str("c"), &int(3)));
    Ok(())
}

#[rstest]
#[case::scalar_source(int(1), Value::pointer_to(int(0)), "source")]
#[case::scalar_destination(Value::Struct(boss()), int(0), "destination")]
fn rejects_invalid_arguments(
    #[case] from: Value,
    #[case] to: Value,
    #[case] expected: &str,
) {
    let result = copy(&from, &to, &CopyConfig::default());
    assert!(matches!(result, Err(MorphError::InvalidArgument { name, .. }) if name == expected));
}

#[rstest]
#[case::nil_pointer(Value::Pointer(Pointer::nil(Type::Struct(manager()).into())))]
#[case::bare_struct(Value::Struct(StructValue::zero(manager())))]
fn rejects_unaddressable_destinations(#[case] to: Value) {
    let result = copy(&Value::Struct(boss()), &to, &CopyConfig::default());
    assert!(matches!(result, Err(MorphError::Unaddressable { .. })));
}

#[rstest]
#[case::nil_source(Value::Pointer(Pointer::nil(Type::Struct(manager()).into())))]
#[case::zero_source(Value::Struct(StructValue::zero(manager())))]
fn nil_or_zero_source_zeroes_destination(#[case] from: Value) -> Result<()> {
    let target = Value::pointer_to(Value::Struct(boss()));
    copy(&from, &target, &CopyConfig::default())?;
    ensure!(copied(&target)?.fields().iter().all(Value::is_zero));
    Ok(())
}

#[rstest]
fn shared_storage_is_left_alone() -> Result<()> {
    let target = Value::pointer_to(Value::Struct(boss()));
    copy(&target, &target, &CopyConfig::default())?;
    ensure!(equal(&Value::Struct(copied(&target)?), &Value::Struct(boss())));
    Ok(())
}

fn counter(copy: SelfCopy) -> Rc<StructType> {
    StructType::builder("Counter")
        .field(FieldDescriptor::new("X", Type::Int(IntKind::I64)))
        .self_copy(copy)
        .build()
}

#[rstest]
fn self_copy_capability_takes_over() -> Result<()> {
    let ty = counter(Rc::new(|value: &Value| match value {
        Value::Struct(sv) => match sv.field("X") {
            Some(Value::Int(x, kind)) => Ok(Value::Struct(
                sv.clone().with("X", Value::Int(x * 2, *kind)),
            )),
            _ => Err(String::from("no X")),
        },
        _ => Err(String::from("not a struct")),
    }));
    let source = StructValue::zero(ty.clone()).with("X", int(4));
    let target = Value::pointer_to(Value::Struct(StructValue::zero(ty)));
    copy(&Value::Struct(source), &target, &CopyConfig::default())?;
    ensure!(is(copied(&target)?.field("X"), &int(8)));
    Ok(())
}

#[rstest]
fn panicking_self_copy_is_recovered() {
    let ty = counter(Rc::new(|_: &Value| -> Result<Value, String> {
        panic!("self copy exploded")
    }));
    let source = StructValue::zero(ty.clone()).with("X", int(4));
    let target = Value::pointer_to(Value::Struct(StructValue::zero(ty)));
    let result = copy(&Value::Struct(source), &target, &CopyConfig::default());
    assert!(matches!(
        result,
        Err(MorphError::CallFailed { ref message, .. }) if message.contains("exploded")
    ));
}

#[rstest]
fn clone_zeroes_on_invalid_source() -> Result<()> {
    let target = Value::pointer_to(Value::Struct(boss()));
    let out = clone(&Value::Invalid, &target, CopyConfig::global());
    ensure!(copied(out)?.fields().iter().all(Value::is_zero));
    Ok(())
}

#[rstest]
fn clone_leaves_nil_destination_alone() {
    let target = Value::Pointer(Pointer::nil(Type::Struct(manager()).into()));
    let out = clone(&Value::Struct(boss()), &target, CopyConfig::global());
    assert!(out.is_nil());
}

#[rstest]
fn clone_logs_and_returns_destination_on_failure() -> Result<()> {
    let target = Value::pointer_to(Value::Struct(boss()));
    let out = clone(&int(3), &target, CopyConfig::global());
    ensure!(equal(&Value::Struct(copied(out)?), &Value::Struct(boss())));
    Ok(())
}

#[rstest]
fn serde_copier_moves_exported_fields(
    user: Rc<StructType>,
    employee: Rc<StructType>,
) -> Result<()> {
    let existing = StructValue::zero(employee).with("NickName", string("kept"));
    let target = Value::pointer_to(Value::Struct(existing));
    SerdeCopier.copy(&Value::Struct(ada(&user)), &target)?;

    let out = copied(&target)?;
    ensure!(is(out.field("Name"), &string("Ada")));
    ensure!(is(out.field("Age"), &int(21)));
    ensure!(is(out.field("Tags"), &strings(&["a", "b"])));
    ensure!(is(out.field("NickName"), &string("kept")));
    ensure!(is(out.field("secret"), &string("")));
    let birthday = out.field("Birthday").and_then(Value::indirect_recursive);
    ensure!(birthday.is_some_and(|b| equal(&b, &string("1815-12-10"))));
    Ok(())
}

#[rstest]
fn integer_map_keys_name_fields_by_code_point() -> Result<()> {
    let letters = StructType::builder("Letters")
        .field(FieldDescriptor::new("A", Type::Int(IntKind::I64)))
        .field(FieldDescriptor::new("65", Type::Int(IntKind::I64)))
        .build();
    let mut source = MapValue::new(Type::Int(IntKind::I64).into(), Type::Int(IntKind::I64).into());
    source.insert(int(65), int(3));
    let target = Value::pointer_to(Value::Struct(StructValue::zero(letters)));
    copy(&Value::Map(source), &target, &CopyConfig::default())?;

    let out = copied(&target)?;
    ensure!(is(out.field("A"), &int(3)));
    ensure!(is(out.field("65"), &int(0)));
    Ok(())
}

#[rstest]
fn serde_copier_keeps_integer_keys_decimal() -> Result<()> {
    let entries = || {
        let mut map = MapValue::new(Type::Int(IntKind::I64).into(), Type::String.into());
        map.insert(int(65), string("sixty-five"));
        map
    };
    let empty = MapValue::new(Type::Int(IntKind::I64).into(), Type::String.into());
    let target = Value::pointer_to(Value::Map(empty));
    SerdeCopier.copy(&Value::Map(entries()), &target)?;
    ensure!(target.indirect_recursive().is_some_and(|out| equal(&out, &Value::Map(entries()))));
    Ok(())
}
