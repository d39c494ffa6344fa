use crate::shared::metadata::{FieldKind, FieldSpec, ValidationRules};

// ============================================================================
// Resource kinds
// ============================================================================

/// Administrable catalog resource.
///
/// Every admin page is an instance of the same list/selection/form pattern
/// parametrized by one of these kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ResourceKind {
    Admin,
    UserGroup,
    Diamond,
    DiamondType,
    Clarity,
    Color,
    ShapeSize,
    Metal,
    Size,
    OrderStatus,
    Brand,
    ColorstoneQuality,
}

const ALL: [ResourceKind; 12] = [
    ResourceKind::Admin,
    ResourceKind::UserGroup,
    ResourceKind::Diamond,
    ResourceKind::DiamondType,
    ResourceKind::Clarity,
    ResourceKind::Color,
    ResourceKind::ShapeSize,
    ResourceKind::Metal,
    ResourceKind::Size,
    ResourceKind::OrderStatus,
    ResourceKind::Brand,
    ResourceKind::ColorstoneQuality,
];

// ============================================================================
// Field descriptors
// ============================================================================

const NAME: FieldSpec = FieldSpec::base("name", "Наименование", FieldKind::Text)
    .rules(ValidationRules::required().with_max_length(255));
const CODE: FieldSpec = FieldSpec::base("code", "Код", FieldKind::Text)
    .rules(ValidationRules::required().with_max_length(64));
const DESCRIPTION: FieldSpec = FieldSpec::base("description", "Описание", FieldKind::TextArea)
    .rules(ValidationRules::none().with_max_length(5000));
const IS_ACTIVE: FieldSpec = FieldSpec::base("is_active", "Активен", FieldKind::Flag);
const DISPLAY_ORDER: FieldSpec = FieldSpec::base("display_order", "Порядок", FieldKind::Integer)
    .rules(ValidationRules::none().with_range(0.0, 100_000.0));
const DIAMOND_TYPE: FieldSpec =
    FieldSpec::attribute("diamond_type_id", "Тип бриллианта", FieldKind::Reference)
        .references(ResourceKind::DiamondType)
        .rules(ValidationRules::required());

const ADMIN_FIELDS: &[FieldSpec] = &[
    NAME,
    FieldSpec::attribute("email", "Email", FieldKind::Text)
        .rules(ValidationRules::required().with_max_length(255)),
    FieldSpec::attribute("user_group_id", "Группа", FieldKind::Reference)
        .references(ResourceKind::UserGroup),
    FieldSpec::attribute("is_super_admin", "Суперадминистратор", FieldKind::Flag).read_only(),
    IS_ACTIVE,
];

const USER_GROUP_FIELDS: &[FieldSpec] = &[NAME, CODE, DESCRIPTION, IS_ACTIVE];

const DIAMOND_FIELDS: &[FieldSpec] = &[
    NAME,
    CODE,
    DIAMOND_TYPE,
    FieldSpec::attribute("clarity_id", "Чистота", FieldKind::Reference)
        .references(ResourceKind::Clarity)
        .depends_on("diamond_type_id"),
    FieldSpec::attribute("color_id", "Цвет", FieldKind::Reference)
        .references(ResourceKind::Color)
        .depends_on("diamond_type_id"),
    FieldSpec::attribute("shape_size_id", "Форма / размер", FieldKind::Reference)
        .references(ResourceKind::ShapeSize)
        .depends_on("diamond_type_id"),
    FieldSpec::attribute("price", "Цена", FieldKind::Decimal)
        .rules(ValidationRules::none().with_range(0.0, 1_000_000_000.0)),
    IS_ACTIVE,
    DISPLAY_ORDER,
];

const DIAMOND_TYPE_FIELDS: &[FieldSpec] = &[NAME, CODE, IS_ACTIVE, DISPLAY_ORDER];

const DIAMOND_CHILD_FIELDS: &[FieldSpec] = &[NAME, CODE, DIAMOND_TYPE, IS_ACTIVE, DISPLAY_ORDER];

const METAL_FIELDS: &[FieldSpec] = &[
    NAME,
    CODE,
    FieldSpec::attribute("purity", "Проба", FieldKind::Decimal)
        .rules(ValidationRules::none().with_range(0.0, 1000.0)),
    IS_ACTIVE,
    DISPLAY_ORDER,
];

const SIZE_FIELDS: &[FieldSpec] = &[NAME, CODE, IS_ACTIVE, DISPLAY_ORDER];

const ORDER_STATUS_FIELDS: &[FieldSpec] = &[
    NAME,
    CODE,
    FieldSpec::attribute("color", "Цвет метки", FieldKind::Text)
        .rules(ValidationRules::none().with_max_length(16)),
    IS_ACTIVE,
    DISPLAY_ORDER,
];

const BRAND_FIELDS: &[FieldSpec] = &[
    NAME,
    CODE,
    DESCRIPTION,
    FieldSpec::attribute("cover", "Обложка", FieldKind::Image),
    IS_ACTIVE,
    DISPLAY_ORDER,
];

const COLORSTONE_QUALITY_FIELDS: &[FieldSpec] =
    &[NAME, CODE, DESCRIPTION, IS_ACTIVE, DISPLAY_ORDER];

// ============================================================================
// Descriptor
// ============================================================================

impl ResourceKind {
    pub fn all() -> &'static [ResourceKind] {
        &ALL
    }

    /// URL segment of the REST collection (e.g. "shape-sizes")
    pub fn collection_name(&self) -> &'static str {
        match self {
            Self::Admin => "admins",
            Self::UserGroup => "user-groups",
            Self::Diamond => "diamonds",
            Self::DiamondType => "diamond-types",
            Self::Clarity => "clarities",
            Self::Color => "colors",
            Self::ShapeSize => "shape-sizes",
            Self::Metal => "metals",
            Self::Size => "sizes",
            Self::OrderStatus => "order-statuses",
            Self::Brand => "brands",
            Self::ColorstoneQuality => "colorstone-qualities",
        }
    }

    pub fn from_collection(name: &str) -> Option<Self> {
        ALL.iter().copied().find(|k| k.collection_name() == name)
    }

    /// Имя элемента для UI (единственное число)
    pub fn element_name(&self) -> &'static str {
        match self {
            Self::Admin => "Администратор",
            Self::UserGroup => "Группа пользователей",
            Self::Diamond => "Бриллиант",
            Self::DiamondType => "Тип бриллианта",
            Self::Clarity => "Чистота",
            Self::Color => "Цвет",
            Self::ShapeSize => "Форма / размер",
            Self::Metal => "Металл",
            Self::Size => "Размер",
            Self::OrderStatus => "Статус заказа",
            Self::Brand => "Бренд",
            Self::ColorstoneQuality => "Качество цветного камня",
        }
    }

    /// Имя списка для UI (множественное число)
    pub fn list_name(&self) -> &'static str {
        match self {
            Self::Admin => "Администраторы",
            Self::UserGroup => "Группы пользователей",
            Self::Diamond => "Бриллианты",
            Self::DiamondType => "Типы бриллиантов",
            Self::Clarity => "Чистота",
            Self::Color => "Цвета",
            Self::ShapeSize => "Формы и размеры",
            Self::Metal => "Металлы",
            Self::Size => "Размеры",
            Self::OrderStatus => "Статусы заказов",
            Self::Brand => "Бренды",
            Self::ColorstoneQuality => "Качества цветных камней",
        }
    }

    pub fn fields(&self) -> &'static [FieldSpec] {
        match self {
            Self::Admin => ADMIN_FIELDS,
            Self::UserGroup => USER_GROUP_FIELDS,
            Self::Diamond => DIAMOND_FIELDS,
            Self::DiamondType => DIAMOND_TYPE_FIELDS,
            Self::Clarity | Self::Color | Self::ShapeSize => DIAMOND_CHILD_FIELDS,
            Self::Metal => METAL_FIELDS,
            Self::Size => SIZE_FIELDS,
            Self::OrderStatus => ORDER_STATUS_FIELDS,
            Self::Brand => BRAND_FIELDS,
            Self::ColorstoneQuality => COLORSTONE_QUALITY_FIELDS,
        }
    }

    pub fn field(&self, key: &str) -> Option<&'static FieldSpec> {
        self.fields().iter().find(|f| f.key == key)
    }

    pub fn image_fields(&self) -> impl Iterator<Item = &'static FieldSpec> {
        self.fields().iter().filter(|f| f.kind == FieldKind::Image)
    }

    pub fn reference_fields(&self) -> impl Iterator<Item = &'static FieldSpec> {
        self.fields()
            .iter()
            .filter(|f| f.kind == FieldKind::Reference)
    }

    /// Fields whose option lists are narrowed by `parent_key`
    pub fn dependents_of(&self, parent_key: &str) -> Vec<&'static FieldSpec> {
        self.fields()
            .iter()
            .filter(|f| f.depends_on == Some(parent_key))
            .collect()
    }

    pub fn has_display_order(&self) -> bool {
        self.field("display_order").is_some()
    }

    /// Attribute that marks a record as protected from deletion and selection
    pub fn protection_flag(&self) -> Option<&'static str> {
        match self {
            Self::Admin => Some("is_super_admin"),
            _ => None,
        }
    }

    /// Query keys the list endpoint accepts as filters
    pub fn is_filter_key(&self, key: &str) -> bool {
        matches!(key, "search" | "is_active") || self.reference_fields().any(|f| f.key == key)
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.collection_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collection_names_round_trip() {
        for kind in ResourceKind::all() {
            assert_eq!(
                ResourceKind::from_collection(kind.collection_name()),
                Some(*kind)
            );
        }
        assert_eq!(ResourceKind::from_collection("invoices"), None);
    }

    #[test]
    fn every_kind_requires_a_name() {
        for kind in ResourceKind::all() {
            let name = kind.field("name").expect("name field");
            assert!(name.rules.is_required(), "{kind} name must be required");
        }
    }

    #[test]
    fn diamond_children_depend_on_type() {
        let deps: Vec<&str> = ResourceKind::Diamond
            .dependents_of("diamond_type_id")
            .iter()
            .map(|f| f.key)
            .collect();
        assert_eq!(deps, vec!["clarity_id", "color_id", "shape_size_id"]);
        assert!(ResourceKind::Metal.dependents_of("diamond_type_id").is_empty());
    }

    #[test]
    fn only_admins_have_protected_records() {
        assert_eq!(ResourceKind::Admin.protection_flag(), Some("is_super_admin"));
        assert!(ResourceKind::all()
            .iter()
            .filter(|k| **k != ResourceKind::Admin)
            .all(|k| k.protection_flag().is_none()));
    }

    #[test]
    fn filter_keys_follow_reference_fields() {
        assert!(ResourceKind::Clarity.is_filter_key("diamond_type_id"));
        assert!(ResourceKind::Metal.is_filter_key("search"));
        assert!(!ResourceKind::Metal.is_filter_key("diamond_type_id"));
        assert!(!ResourceKind::Metal.is_filter_key("purity"));
    }

    #[test]
    fn brand_cover_is_an_image_field() {
        let images: Vec<&str> = ResourceKind::Brand.image_fields().map(|f| f.key).collect();
        assert_eq!(images, vec!["cover"]);
        assert!(!ResourceKind::Brand.field("cover").unwrap().is_editable());
    }
}
