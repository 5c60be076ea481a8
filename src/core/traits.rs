use sea_orm::{ActiveModelBehavior, ActiveModelTrait, EntityTrait};

/// Ties an entity to the active model used to write it.
///
/// SeaORM entities do not name their active model, so every resource served by
/// this crate declares it once:
///
/// ```rust,ignore
/// impl CrudEntity for todo::Entity {
///     type ActiveModelType = todo::ActiveModel;
/// }
/// ```
pub trait CrudEntity: EntityTrait {
    type ActiveModelType: ActiveModelTrait<Entity = Self> + ActiveModelBehavior + Send + Sync;
}
