use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Cart line item entity
///
/// `unit_price`, `currency_code`, `title`, `thumbnail_url` and `creator_id`
/// are snapshotted when the line is added; later catalog changes never touch
/// a stored line. Quantity is the only field a mutation may rewrite.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "cart_items")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub cart_id: Uuid,
    pub item_type: ItemType,
    pub item_id: Uuid,
    pub quantity: i32,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub unit_price: Decimal,
    pub currency_code: String,
    pub title: String,
    #[sea_orm(nullable)]
    pub thumbnail_url: Option<String>,
    pub creator_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::cart::Entity",
        from = "Column::CartId",
        to = "super::cart::Column::Id"
    )]
    Cart,
}

impl Related<super::cart::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Cart.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// The catalog reference of this line as a tagged value
    pub fn line_item(&self) -> LineItemRef {
        LineItemRef::new(self.item_type, self.item_id)
    }

    /// Snapshot price times quantity
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// Discriminant for the two kinds of sellable catalog items
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    EnumIter,
    DeriveActiveEnum,
    strum::Display,
    ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(10))")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ItemType {
    #[sea_orm(string_value = "course")]
    Course,
    #[sea_orm(string_value = "bundle")]
    Bundle,
}

/// A catalog reference that is a course or a bundle, never both and never
/// neither. Stored as the (item_type, item_id) column pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "item_type", content = "item_id", rename_all = "lowercase")]
pub enum LineItemRef {
    Course(Uuid),
    Bundle(Uuid),
}

impl LineItemRef {
    pub fn new(item_type: ItemType, item_id: Uuid) -> Self {
        match item_type {
            ItemType::Course => LineItemRef::Course(item_id),
            ItemType::Bundle => LineItemRef::Bundle(item_id),
        }
    }

    pub fn item_type(&self) -> ItemType {
        match self {
            LineItemRef::Course(_) => ItemType::Course,
            LineItemRef::Bundle(_) => ItemType::Bundle,
        }
    }

    pub fn item_id(&self) -> Uuid {
        match self {
            LineItemRef::Course(id) | LineItemRef::Bundle(id) => *id,
        }
    }
}

impl std::fmt::Display for LineItemRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.item_type(), self.item_id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn line_item_ref_roundtrips_through_columns() {
        let id = Uuid::new_v4();
        let course = LineItemRef::Course(id);

        assert_eq!(course.item_type(), ItemType::Course);
        assert_eq!(course.item_id(), id);
        assert_eq!(LineItemRef::new(course.item_type(), course.item_id()), course);

        let bundle = LineItemRef::Bundle(id);
        assert_eq!(bundle.item_type(), ItemType::Bundle);
        assert_ne!(course, bundle);
    }

    #[test]
    fn line_total_multiplies_snapshot_price() {
        let item = Model {
            id: Uuid::new_v4(),
            cart_id: Uuid::new_v4(),
            item_type: ItemType::Course,
            item_id: Uuid::new_v4(),
            quantity: 3,
            unit_price: dec!(49.99),
            currency_code: "USD".to_string(),
            title: "Intro to Rust".to_string(),
            thumbnail_url: None,
            creator_id: Uuid::new_v4(),
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        };

        assert_eq!(item.line_total(), dec!(149.97));
    }

    #[test]
    fn item_type_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&ItemType::Course).unwrap(),
            "\"course\""
        );
        assert_eq!(
            serde_json::to_string(&ItemType::Bundle).unwrap(),
            "\"bundle\""
        );
        assert_eq!(ItemType::Course.to_string(), "course");
    }
}
