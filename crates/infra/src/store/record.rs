use bloomshop_catalog::{Favorite, Flower, Product, ProductType};
use bloomshop_core::{
    CartId, Entity, FavoriteId, FlowerId, OrderId, ProductId, ProductTypeId, UserId,
};
use bloomshop_sales::{Cart, Order};
use bloomshop_staff::{EmployeeProfile, User};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum RecordKind {
    Cart,
    Order,
    Product,
    ProductType,
    Flower,
    User,
    EmployeeProfile,
    Favorite,
}

/// Primary key of a stored row.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum RowKey {
    Cart(CartId),
    Order(OrderId),
    Product(ProductId),
    ProductType(ProductTypeId),
    Flower(FlowerId),
    User(UserId),
    EmployeeProfile(UserId),
    Favorite(FavoriteId),
}

impl RowKey {
    pub fn kind(&self) -> RecordKind {
        match self {
            RowKey::Cart(_) => RecordKind::Cart,
            RowKey::Order(_) => RecordKind::Order,
            RowKey::Product(_) => RecordKind::Product,
            RowKey::ProductType(_) => RecordKind::ProductType,
            RowKey::Flower(_) => RecordKind::Flower,
            RowKey::User(_) => RecordKind::User,
            RowKey::EmployeeProfile(_) => RecordKind::EmployeeProfile,
            RowKey::Favorite(_) => RecordKind::Favorite,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Record {
    Cart(Cart),
    Order(Order),
    Product(Product),
    ProductType(ProductType),
    Flower(Flower),
    User(User),
    EmployeeProfile(EmployeeProfile),
    Favorite(Favorite),
}

/// A domain record that can be stored as a row.
pub trait Row: Entity + Clone + Sized {
    const RECORD_KIND: RecordKind;

    fn key_of(id: Self::Id) -> RowKey;
    fn into_record(self) -> Record;
    fn from_record(record: &Record) -> Option<&Self>;

    fn row_key(&self) -> RowKey {
        Self::key_of(*self.id())
    }
}

macro_rules! impl_row {
    ($t:ty, $variant:ident) => {
        impl Row for $t {
            const RECORD_KIND: RecordKind = RecordKind::$variant;

            fn key_of(id: Self::Id) -> RowKey {
                RowKey::$variant(id)
            }

            fn into_record(self) -> Record {
                Record::$variant(self)
            }

            fn from_record(record: &Record) -> Option<&Self> {
                match record {
                    Record::$variant(value) => Some(value),
                    _ => None,
                }
            }
        }
    };
}

impl_row!(Cart, Cart);
impl_row!(Order, Order);
impl_row!(Product, Product);
impl_row!(ProductType, ProductType);
impl_row!(Flower, Flower);
impl_row!(User, User);
impl_row!(EmployeeProfile, EmployeeProfile);
impl_row!(Favorite, Favorite);
