// Esquema Diesel de las sesiones de guía.
diesel::table! {
    guide_sessions (session_key) {
        session_key -> Text,
        payload -> Text,
        updated_at -> Text,
    }
}
