//! Uniform names understood by the lighting shader.

pub const PROJECTION: &str = "projection";
pub const VIEW: &str = "view";
pub const MODEL: &str = "model";

pub const LIGHT_POS: &str = "lightPos";
pub const LIGHT_COLOR: &str = "lightColor";
pub const VIEW_POS: &str = "viewPos";
pub const AMBIENT_STRENGTH: &str = "ambientStrength";
pub const MATERIAL_BRIGHTNESS: &str = "materialBrightness";
pub const ENHANCE_CONTRAST: &str = "enhanceContrast";

pub const MATERIAL_AMBIENT: &str = "material_ambient";
pub const MATERIAL_DIFFUSE: &str = "material_diffuse";
pub const MATERIAL_SPECULAR: &str = "material_specular";
pub const MATERIAL_SHININESS: &str = "material_shininess";
pub const HAS_DIFFUSE_TEXTURE: &str = "has_diffuse_texture";
pub const USE_MATERIAL_OVERRIDE: &str = "use_material_override";
