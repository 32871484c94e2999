table! {
    weather_data (id) {
        id -> Integer,
        city -> Text,
        temperature -> Nullable<Double>,
        humidity -> Nullable<Double>,
        description -> Text,
        pressure -> Nullable<Double>,
        timestamp -> Timestamp,
    }
}
