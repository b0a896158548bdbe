use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use utoipa::openapi::schema::{ObjectBuilder, Schema, Type};
use utoipa::openapi::RefOr;

/// Fixed classification attached to every expense. Stored and sent as its integer value.
#[derive(
    Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord,
)]
#[serde(try_from = "i64", into = "i64")]
pub enum Category {
    #[default]
    Other = 0,
    Food = 1,
    Travel = 2,
    Utilities = 3,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Other,
        Category::Food,
        Category::Travel,
        Category::Utilities,
    ];

    pub fn value(self) -> i64 {
        self as i64
    }

    /// Human readable name shown next to the numeric value
    pub fn label(self) -> &'static str {
        match self {
            Category::Other => "Other",
            Category::Food => "Food",
            Category::Travel => "Travel",
            Category::Utilities => "Utilities",
        }
    }
}

/// Documented as the integer it travels as, not as variant names
impl utoipa::PartialSchema for Category {
    fn schema() -> RefOr<Schema> {
        let description = Category::ALL
            .iter()
            .map(|c| format!("{} = {}", c.value(), c.label()))
            .collect::<Vec<_>>()
            .join(", ");

        RefOr::T(Schema::Object(
            ObjectBuilder::new()
                .schema_type(Type::Integer)
                .enum_values(Some(Category::ALL.map(Category::value)))
                .default(Some(Category::default().value().into()))
                .description(Some(description))
                .build(),
        ))
    }
}

impl utoipa::ToSchema for Category {
    fn name() -> Cow<'static, str> {
        Cow::Borrowed("Category")
    }
}

impl TryFrom<i64> for Category {
    type Error = String;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Category::Other),
            1 => Ok(Category::Food),
            2 => Ok(Category::Travel),
            3 => Ok(Category::Utilities),
            other => Err(format!("\"{}\" is not a valid choice.", other)),
        }
    }
}

impl From<Category> for i64 {
    fn from(category: Category) -> Self {
        category.value()
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
