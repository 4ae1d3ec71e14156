use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250101_000001_create_catalog_tables::Migration),
            Box::new(m20250101_000002_create_commerce_tables::Migration),
            Box::new(m20250101_000003_create_healthcare_tables::Migration),
            Box::new(m20250101_000004_create_elab_tables::Migration),
        ]
    }
}

mod m20250101_000001_create_catalog_tables {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250101_000001_create_catalog_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Categories::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Categories::Id).uuid().not_null().primary_key())
                        .col(
                            ColumnDef::new(Categories::Name)
                                .string_len(100)
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Categories::Description).text().null())
                        .col(ColumnDef::new(Categories::ImageRef).string().null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Products::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Products::Id).uuid().not_null().primary_key())
                        .col(ColumnDef::new(Products::CategoryId).uuid().not_null())
                        .col(
                            ColumnDef::new(Products::Name)
                                .string_len(200)
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Products::Price).decimal_len(10, 2).not_null())
                        .col(ColumnDef::new(Products::Description).text().null())
                        .col(
                            ColumnDef::new(Products::Stock)
                                .integer()
                                .not_null()
                                .default(0)
                                .check(Expr::col(Products::Stock).gte(0)),
                        )
                        .col(
                            ColumnDef::new(Products::RequiresPrescription)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(ColumnDef::new(Products::ImageRef).string().null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_products_category_id")
                                .from(Products::Table, Products::CategoryId)
                                .to(Categories::Table, Categories::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_products_category_id")
                        .table(Products::Table)
                        .col(Products::CategoryId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(PetCategories::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(PetCategories::Id).uuid().not_null().primary_key())
                        .col(ColumnDef::new(PetCategories::Name).string_len(100).not_null())
                        .col(ColumnDef::new(PetCategories::ShortDescription).string().null())
                        .col(ColumnDef::new(PetCategories::ImageRef).string().null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(PetProducts::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(PetProducts::Id).uuid().not_null().primary_key())
                        .col(ColumnDef::new(PetProducts::CategoryId).uuid().not_null())
                        .col(ColumnDef::new(PetProducts::Name).string_len(100).not_null())
                        .col(ColumnDef::new(PetProducts::Price).decimal_len(10, 2).not_null())
                        .col(
                            ColumnDef::new(PetProducts::PrescriptionRequired)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(ColumnDef::new(PetProducts::ImageRef).string().null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_pet_products_category_id")
                                .from(PetProducts::Table, PetProducts::CategoryId)
                                .to(PetCategories::Table, PetCategories::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(PetProducts::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(PetCategories::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Products::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Categories::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Categories {
        Table,
        Id,
        Name,
        Description,
        ImageRef,
    }

    #[derive(DeriveIden)]
    enum Products {
        Table,
        Id,
        CategoryId,
        Name,
        Price,
        Description,
        Stock,
        RequiresPrescription,
        ImageRef,
    }

    #[derive(DeriveIden)]
    enum PetCategories {
        Table,
        Id,
        Name,
        ShortDescription,
        ImageRef,
    }

    #[derive(DeriveIden)]
    enum PetProducts {
        Table,
        Id,
        CategoryId,
        Name,
        Price,
        PrescriptionRequired,
        ImageRef,
    }
}

mod m20250101_000002_create_commerce_tables {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250101_000002_create_commerce_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Carts::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Carts::Id).uuid().not_null().primary_key())
                        .col(ColumnDef::new(Carts::UserId).uuid().not_null().unique_key())
                        .col(
                            ColumnDef::new(Carts::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Carts::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(CartItems::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(CartItems::Id).uuid().not_null().primary_key())
                        .col(ColumnDef::new(CartItems::CartId).uuid().not_null())
                        .col(ColumnDef::new(CartItems::ProductKind).string_len(16).not_null())
                        .col(ColumnDef::new(CartItems::ProductId).uuid().not_null())
                        .col(
                            ColumnDef::new(CartItems::Quantity)
                                .integer()
                                .not_null()
                                .default(1)
                                .check(Expr::col(CartItems::Quantity).between(1, 999)),
                        )
                        .col(
                            ColumnDef::new(CartItems::AddedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_cart_items_cart_id")
                                .from(CartItems::Table, CartItems::CartId)
                                .to(Carts::Table, Carts::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .unique()
                        .name("uq_cart_items_cart_product")
                        .table(CartItems::Table)
                        .col(CartItems::CartId)
                        .col(CartItems::ProductKind)
                        .col(CartItems::ProductId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Orders::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Orders::Id).uuid().not_null().primary_key())
                        .col(ColumnDef::new(Orders::UserId).uuid().not_null())
                        .col(ColumnDef::new(Orders::TotalPrice).decimal_len(10, 2).not_null())
                        .col(ColumnDef::new(Orders::PaymentMethod).string_len(20).not_null())
                        .col(
                            ColumnDef::new(Orders::Status)
                                .string_len(20)
                                .not_null()
                                .default("pending"),
                        )
                        .col(
                            ColumnDef::new(Orders::IsPaid)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(
                            ColumnDef::new(Orders::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Orders::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_orders_user_id")
                        .table(Orders::Table)
                        .col(Orders::UserId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(OrderItems::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(OrderItems::Id).uuid().not_null().primary_key())
                        .col(ColumnDef::new(OrderItems::OrderId).uuid().not_null())
                        .col(ColumnDef::new(OrderItems::ProductKind).string_len(16).not_null())
                        .col(ColumnDef::new(OrderItems::ProductId).uuid().null())
                        .col(ColumnDef::new(OrderItems::Name).string_len(200).not_null())
                        .col(ColumnDef::new(OrderItems::Price).decimal_len(10, 2).not_null())
                        .col(
                            ColumnDef::new(OrderItems::Quantity)
                                .integer()
                                .not_null()
                                .check(Expr::col(OrderItems::Quantity).gte(1)),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_order_items_order_id")
                                .from(OrderItems::Table, OrderItems::OrderId)
                                .to(Orders::Table, Orders::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(OrderItems::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Orders::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(CartItems::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Carts::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Carts {
        Table,
        Id,
        UserId,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum CartItems {
        Table,
        Id,
        CartId,
        ProductKind,
        ProductId,
        Quantity,
        AddedAt,
    }

    #[derive(DeriveIden)]
    enum Orders {
        Table,
        Id,
        UserId,
        TotalPrice,
        PaymentMethod,
        Status,
        IsPaid,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum OrderItems {
        Table,
        Id,
        OrderId,
        ProductKind,
        ProductId,
        Name,
        Price,
        Quantity,
    }
}

mod m20250101_000003_create_healthcare_tables {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250101_000003_create_healthcare_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Doctors::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Doctors::Id).uuid().not_null().primary_key())
                        .col(ColumnDef::new(Doctors::UserId).uuid().null().unique_key())
                        .col(ColumnDef::new(Doctors::Name).string_len(100).not_null())
                        .col(ColumnDef::new(Doctors::Specialty).string_len(100).not_null())
                        .col(
                            ColumnDef::new(Doctors::DoctorType)
                                .string_len(10)
                                .not_null()
                                .default("human"),
                        )
                        .col(ColumnDef::new(Doctors::Languages).string_len(200).not_null())
                        .col(ColumnDef::new(Doctors::Location).string_len(200).not_null())
                        .col(ColumnDef::new(Doctors::Fee).decimal_len(10, 2).not_null())
                        .col(ColumnDef::new(Doctors::BkashNumber).string_len(20).null())
                        .col(ColumnDef::new(Doctors::Bio).text().null())
                        .col(ColumnDef::new(Doctors::ImageRef).string().null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Schedules::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Schedules::Id).uuid().not_null().primary_key())
                        .col(ColumnDef::new(Schedules::DoctorId).uuid().not_null())
                        .col(ColumnDef::new(Schedules::DayOfWeek).string_len(10).not_null())
                        .col(ColumnDef::new(Schedules::StartTime).time().not_null())
                        .col(ColumnDef::new(Schedules::EndTime).time().not_null())
                        .check(Expr::col(Schedules::EndTime).gt(Expr::col(Schedules::StartTime)))
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_schedules_doctor_id")
                                .from(Schedules::Table, Schedules::DoctorId)
                                .to(Doctors::Table, Doctors::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .unique()
                        .name("uq_schedules_doctor_window")
                        .table(Schedules::Table)
                        .col(Schedules::DoctorId)
                        .col(Schedules::DayOfWeek)
                        .col(Schedules::StartTime)
                        .col(Schedules::EndTime)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Appointments::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Appointments::Id).uuid().not_null().primary_key())
                        .col(ColumnDef::new(Appointments::DoctorId).uuid().not_null())
                        .col(ColumnDef::new(Appointments::PatientId).uuid().null())
                        .col(ColumnDef::new(Appointments::PatientName).string_len(100).null())
                        .col(ColumnDef::new(Appointments::Phone).string_len(20).null())
                        .col(ColumnDef::new(Appointments::VisitType).string_len(10).not_null())
                        .col(ColumnDef::new(Appointments::Date).date().not_null())
                        .col(ColumnDef::new(Appointments::Time).time().not_null())
                        .col(ColumnDef::new(Appointments::Notes).text().null())
                        .col(
                            ColumnDef::new(Appointments::Status)
                                .string_len(20)
                                .not_null()
                                .default("Booked"),
                        )
                        .col(ColumnDef::new(Appointments::MeetingLink).string().null())
                        .col(ColumnDef::new(Appointments::PrescriptionFile).string().null())
                        .col(
                            ColumnDef::new(Appointments::IsPaid)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(ColumnDef::new(Appointments::PaymentMethod).string_len(16).null())
                        .col(
                            ColumnDef::new(Appointments::Amount)
                                .decimal_len(10, 2)
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(Appointments::TransactionId).string_len(100).null())
                        .col(
                            ColumnDef::new(Appointments::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_appointments_doctor_id")
                                .from(Appointments::Table, Appointments::DoctorId)
                                .to(Doctors::Table, Doctors::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            // The slot guard: concurrent bookings race on this index.
            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .unique()
                        .name("uq_appointments_doctor_slot")
                        .table(Appointments::Table)
                        .col(Appointments::DoctorId)
                        .col(Appointments::Date)
                        .col(Appointments::Time)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_appointments_patient_id")
                        .table(Appointments::Table)
                        .col(Appointments::PatientId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Prescriptions::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Prescriptions::Id).uuid().not_null().primary_key())
                        .col(ColumnDef::new(Prescriptions::UserId).uuid().not_null())
                        .col(ColumnDef::new(Prescriptions::ImageRef).string().not_null())
                        .col(
                            ColumnDef::new(Prescriptions::UploadedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Prescriptions::Status)
                                .string_len(10)
                                .not_null()
                                .default("pending"),
                        )
                        .col(ColumnDef::new(Prescriptions::DoctorId).uuid().null())
                        .col(ColumnDef::new(Prescriptions::Notes).text().null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_prescriptions_doctor_id")
                                .from(Prescriptions::Table, Prescriptions::DoctorId)
                                .to(Doctors::Table, Doctors::Id)
                                .on_delete(ForeignKeyAction::SetNull),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_prescriptions_user_status")
                        .table(Prescriptions::Table)
                        .col(Prescriptions::UserId)
                        .col(Prescriptions::Status)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(PrescriptionProducts::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(PrescriptionProducts::Id)
                                .uuid()
                                .not_null()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(PrescriptionProducts::PrescriptionId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PrescriptionProducts::ProductKind)
                                .string_len(16)
                                .not_null(),
                        )
                        .col(ColumnDef::new(PrescriptionProducts::ProductId).uuid().not_null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_prescription_products_prescription_id")
                                .from(
                                    PrescriptionProducts::Table,
                                    PrescriptionProducts::PrescriptionId,
                                )
                                .to(Prescriptions::Table, Prescriptions::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .unique()
                        .name("uq_prescription_products_link")
                        .table(PrescriptionProducts::Table)
                        .col(PrescriptionProducts::PrescriptionId)
                        .col(PrescriptionProducts::ProductKind)
                        .col(PrescriptionProducts::ProductId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(PrescriptionProducts::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Prescriptions::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Appointments::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Schedules::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Doctors::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Doctors {
        Table,
        Id,
        UserId,
        Name,
        Specialty,
        DoctorType,
        Languages,
        Location,
        Fee,
        BkashNumber,
        Bio,
        ImageRef,
    }

    #[derive(DeriveIden)]
    enum Schedules {
        Table,
        Id,
        DoctorId,
        DayOfWeek,
        StartTime,
        EndTime,
    }

    #[derive(DeriveIden)]
    enum Appointments {
        Table,
        Id,
        DoctorId,
        PatientId,
        PatientName,
        Phone,
        VisitType,
        Date,
        Time,
        Notes,
        Status,
        MeetingLink,
        PrescriptionFile,
        IsPaid,
        PaymentMethod,
        Amount,
        TransactionId,
        CreatedAt,
    }

    #[derive(DeriveIden)]
    enum Prescriptions {
        Table,
        Id,
        UserId,
        ImageRef,
        UploadedAt,
        Status,
        DoctorId,
        Notes,
    }

    #[derive(DeriveIden)]
    enum PrescriptionProducts {
        Table,
        Id,
        PrescriptionId,
        ProductKind,
        ProductId,
    }
}

mod m20250101_000004_create_elab_tables {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250101_000004_create_elab_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(ElabSchedules::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(ElabSchedules::Id).uuid().not_null().primary_key())
                        .col(ColumnDef::new(ElabSchedules::UserId).uuid().not_null())
                        .col(ColumnDef::new(ElabSchedules::TestType).string_len(20).not_null())
                        .col(ColumnDef::new(ElabSchedules::TestName).string_len(100).not_null())
                        .col(ColumnDef::new(ElabSchedules::TestPrice).decimal_len(8, 2).not_null())
                        .col(ColumnDef::new(ElabSchedules::PreferredDate).date().not_null())
                        .col(ColumnDef::new(ElabSchedules::PreferredTime).time().not_null())
                        .col(ColumnDef::new(ElabSchedules::Address).text().not_null())
                        .col(ColumnDef::new(ElabSchedules::Phone).string_len(20).not_null())
                        .col(
                            ColumnDef::new(ElabSchedules::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(ColumnDef::new(ElabSchedules::ReportFile).string().null())
                        .col(
                            ColumnDef::new(ElabSchedules::ReportVerified)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(
                            ColumnDef::new(ElabSchedules::IsPaid)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(ColumnDef::new(ElabSchedules::PaymentMethod).string_len(16).null())
                        .col(ColumnDef::new(ElabSchedules::TransactionId).string_len(100).null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_elab_schedules_user_id")
                        .table(ElabSchedules::Table)
                        .col(ElabSchedules::UserId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(ElabSchedules::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum ElabSchedules {
        Table,
        Id,
        UserId,
        TestType,
        TestName,
        TestPrice,
        PreferredDate,
        PreferredTime,
        Address,
        Phone,
        CreatedAt,
        ReportFile,
        ReportVerified,
        IsPaid,
        PaymentMethod,
        TransactionId,
    }
}
