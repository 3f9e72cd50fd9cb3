// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Rust types that know their own raw metadata.
//!
//! Usually implemented by `#[derive(Artisan)]`. A manual implementation only
//! needs [`Describe::type_name`] and [`Describe::raw_type`] when the type
//! references no other described types.

use crate::descriptor::TypeDescriptor;
use crate::error::Result;
use crate::model::TypeModel;
use crate::raw::RawType;
use std::sync::Arc;

pub trait Describe {
    /// Name the type is registered under.
    fn type_name() -> &'static str;

    /// Unresolved metadata for this type.
    fn raw_type() -> RawType;

    /// Describe the types this one embeds inline.
    fn describe_nested(_model: &mut TypeModel) -> Result<()> {
        Ok(())
    }

    /// Describe the targets of this type's indirect references
    /// (through [`TypeModel::describe_deferred`]).
    fn describe_indirect(_model: &mut TypeModel) -> Result<()> {
        Ok(())
    }

    /// Describe this type and its dependencies into `model`.
    fn describe_into(model: &mut TypeModel) -> Result<Arc<TypeDescriptor>> {
        if let Some(existing) = model.get(Self::type_name()) {
            return Ok(existing);
        }

        model.enter(Self::type_name())?;
        let result = Self::describe_nested(model)
            .and_then(|_| model.describe(&Self::raw_type()))
            .and_then(|desc| Self::describe_indirect(model).map(|_| desc));
        model.leave(Self::type_name());
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DescriptorError;
    use crate::raw::{RawField, RawKind};

    struct Point;
    struct Segment;
    struct List;
    struct Ping;
    struct Pong;

    impl Describe for Point {
        fn type_name() -> &'static str {
            "Point"
        }
        fn raw_type() -> RawType {
            RawType::structure(
                "Point",
                vec![
                    RawField::new("x", RawKind::named("i32")),
                    RawField::new("y", RawKind::named("i32")),
                ],
            )
        }
    }

    impl Describe for Segment {
        fn type_name() -> &'static str {
            "Segment"
        }
        fn raw_type() -> RawType {
            RawType::structure(
                "Segment",
                vec![
                    RawField::new("from", RawKind::named("Point")),
                    RawField::new("to", RawKind::named("Point")),
                ],
            )
        }
        fn describe_nested(model: &mut TypeModel) -> Result<()> {
            Point::describe_into(model).map(|_| ())
        }
    }

    impl Describe for List {
        fn type_name() -> &'static str {
            "List"
        }
        fn raw_type() -> RawType {
            RawType::structure(
                "List",
                vec![
                    RawField::new("head", RawKind::named("u32")),
                    RawField::new("tail", RawKind::indirect("List")).optional(),
                ],
            )
        }
        fn describe_indirect(model: &mut TypeModel) -> Result<()> {
            model.describe_deferred::<List>()
        }
    }

    // Ping { pongs: seq<Pong> }, Pong { ping: Ping }: an inline cycle.
    impl Describe for Ping {
        fn type_name() -> &'static str {
            "Ping"
        }
        fn raw_type() -> RawType {
            RawType::structure(
                "Ping",
                vec![RawField::new(
                    "pongs",
                    RawKind::sequence(RawKind::named("Pong")),
                )],
            )
        }
        fn describe_nested(model: &mut TypeModel) -> Result<()> {
            Pong::describe_into(model).map(|_| ())
        }
    }

    impl Describe for Pong {
        fn type_name() -> &'static str {
            "Pong"
        }
        fn raw_type() -> RawType {
            RawType::structure("Pong", vec![RawField::new("ping", RawKind::named("Ping"))])
        }
        fn describe_nested(model: &mut TypeModel) -> Result<()> {
            Ping::describe_into(model).map(|_| ())
        }
    }

    #[test]
    fn test_describe_type_pulls_in_nested() {
        let mut model = TypeModel::new();
        let segment = model.describe_type::<Segment>().expect("describe");
        assert_eq!(segment.name(), "Segment");
        assert!(model.contains("Point"));
        assert_eq!(model.len(), 2);
    }

    #[test]
    fn test_describe_type_handles_self_recursion() {
        let mut model = TypeModel::new();
        let list = model.describe_type::<List>().expect("describe");
        assert_eq!(list.name(), "List");
        assert_eq!(model.len(), 1);
        assert!(!model.is_pending("List"));
    }

    #[test]
    fn test_describe_type_rejects_inline_cycle() {
        let mut model = TypeModel::new();
        let err = model.describe_type::<Ping>().unwrap_err();
        assert_eq!(
            err,
            DescriptorError::Cycle {
                path: vec!["Ping".into(), "Pong".into(), "Ping".into()],
            }
        );
        assert!(model.is_empty());
        assert!(!model.is_pending("Ping"));
    }
}
