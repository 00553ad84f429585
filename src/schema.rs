diesel::table! {
    things (id) {
        id -> Int4,
        creation_time -> Timestamptz,
        title -> Varchar,
        description -> Nullable<Text>,
        image_id -> Nullable<Varchar>,
        user_id -> Int4,
    }
}

diesel::table! {
    users (id) {
        id -> Int4,
        sub -> Varchar,
        username -> Varchar,
        email -> Varchar,
    }
}

diesel::allow_tables_to_appear_in_same_query!(things, users,);
