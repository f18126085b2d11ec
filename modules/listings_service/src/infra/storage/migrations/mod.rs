//! Database migrations for the listings service

use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250301_000001_create_geography::Migration),
            Box::new(m20250301_000002_create_listings::Migration),
        ]
    }
}

/// Identifier and timestamp columns shared by every record table
fn record_columns<T: IntoIden + Copy + 'static>(
    table: &mut TableCreateStatement,
    id: T,
    created_at: T,
    updated_at: T,
) {
    table
        .col(ColumnDef::new(id).string_len(60).not_null().primary_key())
        .col(
            ColumnDef::new(created_at)
                .timestamp_with_time_zone()
                .not_null()
                .default(Expr::current_timestamp()),
        )
        .col(
            ColumnDef::new(updated_at)
                .timestamp_with_time_zone()
                .not_null()
                .default(Expr::current_timestamp()),
        );
}

#[derive(DeriveIden, Clone, Copy)]
enum States {
    Table,
    Id,
    CreatedAt,
    UpdatedAt,
    Name,
}

#[derive(DeriveIden, Clone, Copy)]
enum Cities {
    Table,
    Id,
    CreatedAt,
    UpdatedAt,
    StateId,
    Name,
}

#[derive(DeriveIden, Clone, Copy)]
enum Users {
    Table,
    Id,
    CreatedAt,
    UpdatedAt,
    Email,
    Password,
    FirstName,
    LastName,
}

#[derive(DeriveIden, Clone, Copy)]
enum Amenities {
    Table,
    Id,
    CreatedAt,
    UpdatedAt,
    Name,
}

#[derive(DeriveIden, Clone, Copy)]
enum Places {
    Table,
    Id,
    CreatedAt,
    UpdatedAt,
    CityId,
    UserId,
    Name,
    Description,
    NumberRooms,
    NumberBathrooms,
    MaxGuest,
    PriceByNight,
    Latitude,
    Longitude,
}

#[derive(DeriveIden, Clone, Copy)]
enum Reviews {
    Table,
    Id,
    CreatedAt,
    UpdatedAt,
    PlaceId,
    UserId,
    Text,
}

#[derive(DeriveIden, Clone, Copy)]
enum PlaceAmenity {
    Table,
    PlaceId,
    AmenityId,
    Position,
}

mod m20250301_000001_create_geography {
    use super::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250301_000001_create_geography"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            let mut states = Table::create();
            states.table(States::Table).if_not_exists();
            record_columns(&mut states, States::Id, States::CreatedAt, States::UpdatedAt);
            states.col(ColumnDef::new(States::Name).string_len(128).not_null());
            manager.create_table(states.to_owned()).await?;

            let mut cities = Table::create();
            cities.table(Cities::Table).if_not_exists();
            record_columns(&mut cities, Cities::Id, Cities::CreatedAt, Cities::UpdatedAt);
            cities
                .col(ColumnDef::new(Cities::StateId).string_len(60).not_null())
                .col(ColumnDef::new(Cities::Name).string_len(128).not_null())
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_cities_state")
                        .from(Cities::Table, Cities::StateId)
                        .to(States::Table, States::Id)
                        .on_delete(ForeignKeyAction::Cascade),
                );
            manager.create_table(cities.to_owned()).await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Cities::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(States::Table).to_owned())
                .await
        }
    }
}

mod m20250301_000002_create_listings {
    use super::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250301_000002_create_listings"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            let mut users = Table::create();
            users.table(Users::Table).if_not_exists();
            record_columns(&mut users, Users::Id, Users::CreatedAt, Users::UpdatedAt);
            users
                .col(
                    ColumnDef::new(Users::Email)
                        .string_len(128)
                        .not_null()
                        .unique_key(),
                )
                .col(ColumnDef::new(Users::Password).string_len(128).not_null())
                .col(ColumnDef::new(Users::FirstName).string_len(128))
                .col(ColumnDef::new(Users::LastName).string_len(128));
            manager.create_table(users.to_owned()).await?;

            let mut amenities = Table::create();
            amenities.table(Amenities::Table).if_not_exists();
            record_columns(
                &mut amenities,
                Amenities::Id,
                Amenities::CreatedAt,
                Amenities::UpdatedAt,
            );
            amenities.col(ColumnDef::new(Amenities::Name).string_len(128).not_null());
            manager.create_table(amenities.to_owned()).await?;

            let mut places = Table::create();
            places.table(Places::Table).if_not_exists();
            record_columns(&mut places, Places::Id, Places::CreatedAt, Places::UpdatedAt);
            places
                .col(ColumnDef::new(Places::CityId).string_len(60).not_null())
                .col(ColumnDef::new(Places::UserId).string_len(60).not_null())
                .col(ColumnDef::new(Places::Name).string_len(128).not_null())
                .col(ColumnDef::new(Places::Description).string_len(1024))
                .col(
                    ColumnDef::new(Places::NumberRooms)
                        .integer()
                        .not_null()
                        .default(0),
                )
                .col(
                    ColumnDef::new(Places::NumberBathrooms)
                        .integer()
                        .not_null()
                        .default(0),
                )
                .col(ColumnDef::new(Places::MaxGuest).integer().not_null().default(0))
                .col(
                    ColumnDef::new(Places::PriceByNight)
                        .integer()
                        .not_null()
                        .default(0),
                )
                .col(ColumnDef::new(Places::Latitude).double())
                .col(ColumnDef::new(Places::Longitude).double())
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_places_city")
                        .from(Places::Table, Places::CityId)
                        .to(Cities::Table, Cities::Id)
                        .on_delete(ForeignKeyAction::Cascade),
                )
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_places_user")
                        .from(Places::Table, Places::UserId)
                        .to(Users::Table, Users::Id)
                        .on_delete(ForeignKeyAction::Cascade),
                );
            manager.create_table(places.to_owned()).await?;

            let mut reviews = Table::create();
            reviews.table(Reviews::Table).if_not_exists();
            record_columns(&mut reviews, Reviews::Id, Reviews::CreatedAt, Reviews::UpdatedAt);
            reviews
                .col(ColumnDef::new(Reviews::PlaceId).string_len(60).not_null())
                .col(ColumnDef::new(Reviews::UserId).string_len(60).not_null())
                .col(ColumnDef::new(Reviews::Text).string_len(1024).not_null())
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_reviews_place")
                        .from(Reviews::Table, Reviews::PlaceId)
                        .to(Places::Table, Places::Id)
                        .on_delete(ForeignKeyAction::Cascade),
                )
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_reviews_user")
                        .from(Reviews::Table, Reviews::UserId)
                        .to(Users::Table, Users::Id)
                        .on_delete(ForeignKeyAction::Cascade),
                );
            manager.create_table(reviews.to_owned()).await?;

            manager
                .create_table(
                    Table::create()
                        .table(PlaceAmenity::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(PlaceAmenity::PlaceId).string_len(60).not_null())
                        .col(ColumnDef::new(PlaceAmenity::AmenityId).string_len(60).not_null())
                        .col(ColumnDef::new(PlaceAmenity::Position).integer().not_null())
                        .primary_key(
                            Index::create()
                                .col(PlaceAmenity::PlaceId)
                                .col(PlaceAmenity::AmenityId),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_place_amenity_place")
                                .from(PlaceAmenity::Table, PlaceAmenity::PlaceId)
                                .to(Places::Table, Places::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_place_amenity_amenity")
                                .from(PlaceAmenity::Table, PlaceAmenity::AmenityId)
                                .to(Amenities::Table, Amenities::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(PlaceAmenity::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Reviews::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Places::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Amenities::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Users::Table).to_owned())
                .await
        }
    }
}
