//! SeaORM entities for database tables

/// States table entity
pub mod state {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
    #[sea_orm(table_name = "states")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: String,
        pub created_at: DateTimeUtc,
        pub updated_at: DateTimeUtc,
        pub name: String,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(has_many = "super::city::Entity")]
        Cities,
    }

    impl Related<super::city::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Cities.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}
}

/// Cities table entity
pub mod city {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
    #[sea_orm(table_name = "cities")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: String,
        pub created_at: DateTimeUtc,
        pub updated_at: DateTimeUtc,
        pub state_id: String,
        pub name: String,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(
            belongs_to = "super::state::Entity",
            from = "Column::StateId",
            to = "super::state::Column::Id",
            on_delete = "Cascade"
        )]
        State,
        #[sea_orm(has_many = "super::place::Entity")]
        Places,
    }

    impl Related<super::state::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::State.def()
        }
    }

    impl Related<super::place::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Places.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}
}

/// Users table entity
pub mod user {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
    #[sea_orm(table_name = "users")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: String,
        pub created_at: DateTimeUtc,
        pub updated_at: DateTimeUtc,
        #[sea_orm(unique)]
        pub email: String,
        pub password: String,
        pub first_name: Option<String>,
        pub last_name: Option<String>,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(has_many = "super::place::Entity")]
        Places,
        #[sea_orm(has_many = "super::review::Entity")]
        Reviews,
    }

    impl Related<super::place::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Places.def()
        }
    }

    impl Related<super::review::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Reviews.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}
}

/// Amenities table entity
pub mod amenity {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
    #[sea_orm(table_name = "amenities")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: String,
        pub created_at: DateTimeUtc,
        pub updated_at: DateTimeUtc,
        pub name: String,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(has_many = "super::place_amenity::Entity")]
        PlaceAmenity,
    }

    /// Many-to-many through `place_amenity`
    impl Related<super::place::Entity> for Entity {
        fn to() -> RelationDef {
            super::place_amenity::Relation::Place.def()
        }

        fn via() -> Option<RelationDef> {
            Some(super::place_amenity::Relation::Amenity.def().rev())
        }
    }

    impl ActiveModelBehavior for ActiveModel {}
}

/// Places table entity
pub mod place {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
    #[sea_orm(table_name = "places")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: String,
        pub created_at: DateTimeUtc,
        pub updated_at: DateTimeUtc,
        pub city_id: String,
        pub user_id: String,
        pub name: String,
        pub description: Option<String>,
        pub number_rooms: i32,
        pub number_bathrooms: i32,
        pub max_guest: i32,
        pub price_by_night: i32,
        pub latitude: Option<f64>,
        pub longitude: Option<f64>,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(
            belongs_to = "super::city::Entity",
            from = "Column::CityId",
            to = "super::city::Column::Id",
            on_delete = "Cascade"
        )]
        City,
        #[sea_orm(
            belongs_to = "super::user::Entity",
            from = "Column::UserId",
            to = "super::user::Column::Id",
            on_delete = "Cascade"
        )]
        User,
        #[sea_orm(has_many = "super::review::Entity")]
        Reviews,
        #[sea_orm(has_many = "super::place_amenity::Entity")]
        PlaceAmenity,
    }

    impl Related<super::city::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::City.def()
        }
    }

    impl Related<super::user::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::User.def()
        }
    }

    impl Related<super::review::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Reviews.def()
        }
    }

    /// Many-to-many through `place_amenity`
    impl Related<super::amenity::Entity> for Entity {
        fn to() -> RelationDef {
            super::place_amenity::Relation::Amenity.def()
        }

        fn via() -> Option<RelationDef> {
            Some(super::place_amenity::Relation::Place.def().rev())
        }
    }

    impl ActiveModelBehavior for ActiveModel {}
}

/// Reviews table entity
pub mod review {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
    #[sea_orm(table_name = "reviews")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: String,
        pub created_at: DateTimeUtc,
        pub updated_at: DateTimeUtc,
        pub place_id: String,
        pub user_id: String,
        pub text: String,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(
            belongs_to = "super::place::Entity",
            from = "Column::PlaceId",
            to = "super::place::Column::Id",
            on_delete = "Cascade"
        )]
        Place,
        #[sea_orm(
            belongs_to = "super::user::Entity",
            from = "Column::UserId",
            to = "super::user::Column::Id",
            on_delete = "Cascade"
        )]
        User,
    }

    impl Related<super::place::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Place.def()
        }
    }

    impl Related<super::user::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::User.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}
}

/// Place <-> Amenity association table
pub mod place_amenity {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
    #[sea_orm(table_name = "place_amenity")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub place_id: String,
        #[sea_orm(primary_key, auto_increment = false)]
        pub amenity_id: String,
        /// Link order within the place
        pub position: i32,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(
            belongs_to = "super::place::Entity",
            from = "Column::PlaceId",
            to = "super::place::Column::Id",
            on_delete = "Cascade"
        )]
        Place,
        #[sea_orm(
            belongs_to = "super::amenity::Entity",
            from = "Column::AmenityId",
            to = "super::amenity::Column::Id",
            on_delete = "Cascade"
        )]
        Amenity,
    }

    impl Related<super::place::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Place.def()
        }
    }

    impl Related<super::amenity::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Amenity.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}
}
