//! Copying between independently declared structs through `#[derive(Reflect)]`.

use std::collections::BTreeMap;

use anyhow::{Result, ensure};
use rstest::{fixture, rstest};
use structmorph::{
    Cloner, Copier, CopyConfig, MethodDescriptor, MorphError, Reflect, Value, copy_into,
};

#[derive(Reflect, Clone, Debug, Default, PartialEq)]
#[morph(methods = user_methods)]
struct User {
    name: String,
    age: i8,
    weight: f32,
    tags: Vec<String>,
    role: String,
    #[morph(rename = "nickName")]
    nick_name: String,
    birthday: Option<String>,
    #[morph(private)]
    secret: String,
}

fn user_methods() -> Vec<MethodDescriptor> {
    vec![MethodDescriptor::getter("DoubleAge", |user: &User| {
        i64::from(user.age) * 2
    })]
}

#[derive(Reflect, Debug, Default, PartialEq)]
#[morph(methods = employee_methods)]
struct Employee {
    name: String,
    age: i64,
    weight: f64,
    tags: Vec<String>,
    role_name: String,
    nick_name: String,
    birthday: Option<String>,
    double_age: i64,
    #[morph(private)]
    secret: String,
}

fn employee_methods() -> Vec<MethodDescriptor> {
    vec![MethodDescriptor::setter(
        "Role",
        |employee: &mut Employee, role: String| employee.role_name = format!("Super {role}"),
    )]
}

#[fixture]
fn ada() -> User {
    User {
        name: "Ada".into(),
        age: 21,
        weight: 0.1,
        tags: vec!["a".into(), "b".into()],
        role: "admin".into(),
        nick_name: "countess".into(),
        birthday: Some("1815-12-10".into()),
        secret: "s".into(),
    }
}

#[rstest]
fn user_becomes_employee(ada: User) -> Result<()> {
    let mut employee = Employee::default();
    copy_into(&ada, &mut employee, CopyConfig::global())?;
    ensure!(
        employee
            == Employee {
                name: "Ada".into(),
                age: 21,
                weight: f64::from(0.1_f32),
                tags: vec!["a".into(), "b".into()],
                role_name: "Super admin".into(),
                nick_name: "countess".into(),
                birthday: Some("1815-12-10".into()),
                double_age: 42,
                secret: String::new(),
            },
        "unexpected employee {employee:?}"
    );
    Ok(())
}

#[rstest]
fn copies_are_deep(ada: User) -> Result<()> {
    let mut first = User::default();
    copy_into(&ada, &mut first, CopyConfig::global())?;
    let mut second = User::default();
    copy_into(&first, &mut second, CopyConfig::global())?;
    ensure!(second == User { secret: String::new(), ..ada });
    Ok(())
}

#[rstest]
fn ignored_and_remapped_names(ada: User) -> Result<()> {
    let config = CopyConfig::new()
        .with_ignored_names(["Tags"])
        .with_name_mappings([("Name", "RoleName")]);
    let mut employee = Employee::default();
    copy_into(&ada, &mut employee, &config)?;
    ensure!(employee.tags.is_empty());
    ensure!(employee.name.is_empty());
    ensure!(employee.role_name == "Super admin");
    Ok(())
}

#[rstest]
fn visibility_override_reaches_private_fields(ada: User) -> Result<()> {
    let config = CopyConfig::new().with_visibility_override(true);
    let mut employee = Employee::default();
    copy_into(&ada, &mut employee, &config)?;
    ensure!(employee.secret == "s");
    Ok(())
}

#[rstest]
fn unexported_error_surfaces_when_strict(ada: User) -> Result<()> {
    let config = CopyConfig::new().with_ignore_unexported_error(false);
    let mut employee = Employee::default();
    let result = copy_into(&ada, &mut employee, &config);
    ensure!(
        result
            .as_ref()
            .is_err_and(|err| err.any(|e| matches!(e, MorphError::FieldNotSettable { .. }))),
        "unexpected result {result:?}"
    );
    Ok(())
}

#[derive(Reflect, Debug, Default, PartialEq)]
struct Base {
    id: u64,
    region: String,
}

#[derive(Reflect, Debug, Default, PartialEq)]
struct Manager {
    #[morph(embed)]
    base: Base,
    title: String,
}

#[derive(Reflect, Debug, Default, PartialEq)]
struct Flat {
    id: u64,
    region: String,
    title: String,
}

#[rstest]
fn embedded_fields_are_promoted() -> Result<()> {
    let manager = Manager {
        base: Base {
            id: 7,
            region: "emea".into(),
        },
        title: "cto".into(),
    };
    let mut flat = Flat::default();
    copy_into(&manager, &mut flat, CopyConfig::global())?;
    ensure!(
        flat == Flat {
            id: 7,
            region: "emea".into(),
            title: "cto".into(),
        }
    );
    Ok(())
}

#[derive(Reflect, Clone, Debug, Default, PartialEq)]
#[morph(cloneable)]
struct Snapshot {
    label: String,
    #[morph(private)]
    revision: u32,
}

#[rstest]
fn cloneable_types_copy_through_clone() -> Result<()> {
    let source = Snapshot {
        label: "v1".into(),
        revision: 3,
    };
    let mut copy = Snapshot::default();
    copy_into(&source, &mut copy, CopyConfig::global())?;
    ensure!(copy == source, "private state should survive a self copy");
    Ok(())
}

#[derive(Reflect, Debug, Default, PartialEq)]
struct Limits {
    max_items: u16,
    label: String,
}

#[rstest]
fn maps_fill_structs_by_title_cased_keys() -> Result<()> {
    let mut source: BTreeMap<String, Value> = BTreeMap::new();
    source.insert("MaxItems".into(), 12_i64.to_value());
    source.insert("label".into(), String::from("small").to_value());
    let target = Value::pointer_to(Limits::default().to_value());
    Cloner::default().copy(&source.to_value(), &target)?;
    let limits = Limits::from_value(&target)?;
    ensure!(
        limits
            == Limits {
                max_items: 12,
                label: "small".into(),
            },
        "unexpected limits {limits:?}"
    );
    Ok(())
}

#[rstest]
fn reflected_type_describes_fields() {
    let reflected = User::reflect_type();
    let Some(ty) = reflected.as_struct() else {
        panic!("User should reflect as a struct");
    };
    let names: Vec<&str> = ty.fields().iter().map(|f| f.name()).collect();
    assert_eq!(
        names,
        [
            "Name", "Age", "Weight", "Tags", "Role", "nickName", "Birthday", "secret"
        ]
    );
    assert!(ty.method("DoubleAge").is_some());
    assert!(ty.fields().iter().any(|f| f.name() == "secret" && !f.is_visible()));
}

mod left {
    use structmorph::Reflect;

    #[derive(Reflect, Debug, Default, PartialEq)]
    pub struct Point {
        pub x: i8,
    }
}

mod right {
    use structmorph::Reflect;

    #[derive(Reflect, Debug, Default, PartialEq)]
    pub struct Point {
        pub x: i64,
    }
}

#[derive(Reflect, Debug, Default, PartialEq)]
struct Wrapper<T> {
    value: T,
}

#[derive(Reflect, Debug, Default, PartialEq)]
struct Narrow {
    point: left::Point,
    wrapper: Wrapper<i8>,
}

#[derive(Reflect, Debug, Default, PartialEq)]
struct Wide {
    point: right::Point,
    wrapper: Wrapper<i64>,
}

fn narrow() -> Narrow {
    Narrow {
        point: left::Point { x: 5 },
        wrapper: Wrapper { value: 6 },
    }
}

fn wide() -> Wide {
    Wide {
        point: right::Point { x: 5 },
        wrapper: Wrapper { value: 6 },
    }
}

#[rstest]
fn same_named_types_stay_distinct() {
    assert_ne!(left::Point::reflect_type(), right::Point::reflect_type());
    assert_ne!(Wrapper::<i8>::reflect_type(), Wrapper::<i64>::reflect_type());
    assert_eq!(left::Point::reflect_type(), left::Point::reflect_type());
    assert_eq!(left::Point::reflect_type().to_string(), "Point");
}

#[rstest]
fn same_named_fields_widen_through_copy_into() -> Result<()> {
    let mut copied = Wide::default();
    copy_into(&narrow(), &mut copied, CopyConfig::global())?;
    ensure!(copied == wide(), "unexpected copy {copied:?}");
    Ok(())
}

#[rstest]
fn same_named_fields_widen_through_raw_copy() -> Result<()> {
    let target = Value::pointer_to(Wide::default().to_value());
    Cloner::default().copy(&narrow().to_value(), &target)?;
    let copied = Wide::from_value(&target)?;
    ensure!(copied == wide(), "unexpected copy {copied:?}");
    Ok(())
}

thread_local! {
    static TABLE_BUILDS: std::cell::Cell<usize> = const { std::cell::Cell::new(0) };
}

fn counted_methods() -> Vec<MethodDescriptor> {
    TABLE_BUILDS.set(TABLE_BUILDS.get() + 1);
    Vec::new()
}

#[derive(Reflect, Debug, Default, PartialEq)]
#[morph(methods = counted_methods)]
struct Counted {
    items: Vec<u8>,
}

#[rstest]
fn type_tables_are_built_once_per_thread() -> Result<()> {
    let source = Counted { items: vec![1, 2] };
    for _ in 0..3 {
        let mut copy = Counted::default();
        copy_into(&source, &mut copy, CopyConfig::global())?;
        ensure!(copy == source);
    }
    ensure!(TABLE_BUILDS.get() == 1, "built {} times", TABLE_BUILDS.get());
    Ok(())
}
