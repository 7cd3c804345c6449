use uuid::Uuid;

/// Identifies entities that expose a stable key inside their collection.
pub trait Identifiable {
    fn id(&self) -> &str;
}

/// Provides access to a human-friendly entity name.
pub trait NamedEntity {
    fn name(&self) -> &str;
}

/// Supplies a presentation-ready label for UI or logs.
pub trait Displayable {
    fn display_label(&self) -> String;
}

/// Generates a collection key such as `exp_1b4e28ba2fa1414f8d3c5e0a9b2c7d11`.
pub fn new_id(prefix: &str) -> String {
    format!("{}_{}", prefix, Uuid::new_v4().simple())
}

/// Sums an iterator of amounts. Non-finite values are ignored.
pub fn sum_amounts<I>(amounts: I) -> f64
where
    I: IntoIterator<Item = f64>,
{
    amounts.into_iter().filter(|value| value.is_finite()).sum()
}
