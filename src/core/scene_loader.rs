// Copyright @yucwang 2026

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::core::bsdf::{BsdfContext, Material};
use crate::core::emitter::{Emitter, Light};
use crate::core::error::LoadError;
use crate::core::light_sampler::LightSampler;
use crate::core::texture::Texture;
use crate::emitters::envmap::EnvironmentMap;
use crate::materials::lambertian_diffuse::DiffuseMaterial;
use crate::materials::roughconductor::RoughConductorMaterial;
use crate::materials::roughplastic::RoughPlasticMaterial;
use crate::math::constants::{Float, Vector2f};
use crate::math::spectrum::Spectrum;
use crate::math::transform::Transform;
use crate::textures::constant::ConstantTexture;
use crate::textures::image::{ImageTexture, TextureEncoding};

const DEFAULT_ALPHA: Float = 0.1;
const DEFAULT_REFLECTANCE: Float = 0.5;
const DEFAULT_INT_IOR: Float = 1.49;
const DEFAULT_EXT_IOR: Float = 1.000277;

/// Everything the sampling core needs from a scene file.
#[derive(Debug)]
pub struct SceneDescription {
    pub textures: Vec<Texture>,
    /// Materials by id, in declaration order.
    pub materials: Vec<(String, Material)>,
    pub lights: Vec<Light>,
    pub envmap: Option<EnvironmentMap>,
    pub light_sampler: LightSampler,
    pub sample_count: Option<usize>,
}

impl SceneDescription {
    pub fn material(&self, id: &str) -> Option<&Material> {
        self.materials.iter().find(|(name, _)| name == id).map(|(_, m)| m)
    }

    pub fn bsdf_context(&self, uv: Vector2f) -> BsdfContext<'_> {
        BsdfContext::new(&self.textures, uv)
    }
}

pub fn load_scene_description<P: AsRef<Path>>(path: P) -> Result<SceneDescription, LoadError> {
    let path = path.as_ref();
    log::info!("Starting loading scene description from: {}.", path.display());
    let xml = fs::read_to_string(path)?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    parse_scene_description(&xml, base_dir)
}

/// Parses a scene document; relative file names resolve against `base_dir`.
pub fn parse_scene_description(xml: &str, base_dir: &Path) -> Result<SceneDescription, LoadError> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);
    let mut buf = Vec::new();
    let mut parser = SceneParser::new(base_dir);

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Eof => break,
            Event::Start(e) => parser.open(&e, false)?,
            Event::Empty(e) => parser.open(&e, true)?,
            Event::End(e) => {
                if is_entity_tag(e.name().as_ref()) {
                    parser.close_entity()?;
                }
            }
            _ => {}
        }
        buf.clear();
    }

    parser.finish()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EntityKind {
    Texture,
    Bsdf,
    Emitter,
}

#[derive(Debug, Default)]
struct Properties {
    floats: HashMap<String, Float>,
    strings: HashMap<String, String>,
    spectra: HashMap<String, Spectrum>,
    refs: HashMap<String, String>,
    matrix: Option<Transform>,
}

impl Properties {
    fn float(&self, key: &str) -> Option<Float> {
        self.floats.get(key).copied()
    }

    /// A `<spectrum>` entry, or a `<float>` promoted to a constant spectrum.
    fn spectrum(&self, key: &str) -> Option<Spectrum> {
        self.spectra.get(key).cloned()
            .or_else(|| self.float(key).map(Spectrum::Constant))
    }
}

#[derive(Debug)]
struct PendingEntity {
    kind: EntityKind,
    type_name: String,
    id: Option<String>,
    shape: Option<usize>,
    props: Properties,
}

struct SceneParser {
    base_dir: PathBuf,
    defaults: HashMap<String, String>,
    pending: Option<PendingEntity>,
    textures: Vec<Texture>,
    texture_ids: HashMap<String, usize>,
    materials: Vec<(String, Material)>,
    lights: Vec<Light>,
    envmap: Option<EnvironmentMap>,
    sample_count: Option<usize>,
}

impl SceneParser {
    fn new(base_dir: &Path) -> Self {
        Self {
            base_dir: base_dir.to_path_buf(),
            defaults: HashMap::new(),
            pending: None,
            textures: Vec::new(),
            texture_ids: HashMap::new(),
            materials: Vec::new(),
            lights: Vec::new(),
            envmap: None,
            sample_count: None,
        }
    }

    fn open(&mut self, e: &BytesStart, self_closing: bool) -> Result<(), LoadError> {
        let name = e.name();
        let tag = name.as_ref();
        let attrs = read_attributes(e, &self.defaults)?;

        match tag {
            b"scene" => {}
            b"default" => {
                let key = required(&attrs, "name")?.to_string();
                let value = required(&attrs, "value")?.to_string();
                self.defaults.insert(key, value);
            }
            b"texture" | b"bsdf" | b"emitter" => {
                if self.pending.is_some() {
                    return Err(LoadError::Parse(format!("nested <{}> is not supported",
                                                        String::from_utf8_lossy(tag))));
                }
                let kind = match tag {
                    b"texture" => EntityKind::Texture,
                    b"bsdf" => EntityKind::Bsdf,
                    _ => EntityKind::Emitter,
                };
                let shape = match attrs.get("shape") {
                    Some(v) => Some(parse_usize(v)?),
                    None => None,
                };
                self.pending = Some(PendingEntity {
                    kind,
                    type_name: required(&attrs, "type")?.to_string(),
                    id: attrs.get("id").cloned(),
                    shape,
                    props: Properties::default(),
                });
                if self_closing {
                    self.close_entity()?;
                }
            }
            b"float" | b"integer" | b"string" | b"spectrum" | b"ref" | b"blackbody" | b"matrix" => {
                self.property(tag, &attrs)?;
            }
            other => {
                log::warn!("SceneLoader: ignoring unsupported element <{}>.", String::from_utf8_lossy(other));
            }
        }
        Ok(())
    }

    fn property(&mut self, tag: &[u8], attrs: &HashMap<String, String>) -> Result<(), LoadError> {
        if tag == b"integer" && self.pending.is_none() {
            let key = required(attrs, "name")?;
            let value = parse_usize(required(attrs, "value")?)?;
            if key == "sample_count" {
                self.sample_count = Some(value);
            } else {
                log::warn!("SceneLoader: ignoring top-level integer {}.", key);
            }
            return Ok(());
        }

        let pending = match self.pending.as_mut() {
            Some(pending) => pending,
            None => {
                log::warn!("SceneLoader: ignoring <{}> outside of any entity.", String::from_utf8_lossy(tag));
                return Ok(());
            }
        };
        let props = &mut pending.props;

        match tag {
            b"float" | b"integer" => {
                let key = required(attrs, "name")?.to_string();
                let value = parse_float(required(attrs, "value")?)?;
                props.floats.insert(key, value);
            }
            b"string" => {
                let key = required(attrs, "name")?.to_string();
                props.strings.insert(key, required(attrs, "value")?.to_string());
            }
            b"spectrum" => {
                let key = required(attrs, "name")?.to_string();
                props.spectra.insert(key, parse_spectrum(required(attrs, "value")?)?);
            }
            b"ref" => {
                let key = required(attrs, "name")?.to_string();
                props.refs.insert(key, required(attrs, "id")?.to_string());
            }
            b"blackbody" => {
                let key = attrs.get("name").cloned().unwrap_or_else(|| String::from("radiance"));
                let temperature = parse_float(required(attrs, "temperature")?)?;
                let scale = match attrs.get("scale") {
                    Some(v) => parse_float(v)?,
                    None => 1.0,
                };
                props.spectra.insert(key, Spectrum::Blackbody { temperature, scale });
            }
            _ => {
                props.matrix = Some(parse_matrix(required(attrs, "value")?)?);
            }
        }
        Ok(())
    }

    fn close_entity(&mut self) -> Result<(), LoadError> {
        let entity = match self.pending.take() {
            Some(entity) => entity,
            None => return Ok(()),
        };
        match entity.kind {
            EntityKind::Texture => self.add_texture(entity),
            EntityKind::Bsdf => self.add_bsdf(entity),
            EntityKind::Emitter => self.add_emitter(entity),
        }
    }

    fn resolve_path(&self, filename: &str) -> Result<String, LoadError> {
        let path = self.base_dir.join(filename);
        path.to_str()
            .map(|s| s.to_string())
            .ok_or_else(|| LoadError::Parse(format!("non utf-8 path: {}", path.display())))
    }

    fn add_texture(&mut self, entity: PendingEntity) -> Result<(), LoadError> {
        let id = entity.id.clone().ok_or(LoadError::MissingField("id"))?;
        let texture = match entity.type_name.as_str() {
            "constant" => {
                let reflectance = entity.props.float("reflectance").unwrap_or(DEFAULT_REFLECTANCE);
                Texture::Constant(ConstantTexture::from_gray(reflectance))
            }
            "image" | "bitmap" => {
                let filename = entity.props.strings.get("filename").ok_or(LoadError::MissingField("filename"))?;
                let encoding = match entity.props.strings.get("encoding").map(|s| s.as_str()) {
                    None | Some("reflectance") => TextureEncoding::Reflectance,
                    Some("coefficients") => TextureEncoding::Coefficients,
                    Some(other) => return Err(LoadError::Parse(format!("unknown texture encoding: {}", other))),
                };
                let path = self.resolve_path(filename)?;
                Texture::Image(ImageTexture::from_file(&path, encoding)?)
            }
            other => return Err(LoadError::Parse(format!("unsupported texture type: {}", other))),
        };
        log::debug!("SceneLoader: texture {} = {}.", id, texture.describe());
        self.texture_ids.insert(id, self.textures.len());
        self.textures.push(texture);
        Ok(())
    }

    /// Texture slot for a `reflectance` property: a reference, an inline
    /// gray value, or the default gray.
    fn reflectance_slot(&mut self, props: &Properties) -> Result<usize, LoadError> {
        if let Some(id) = props.refs.get("reflectance") {
            return self.texture_ids.get(id).copied()
                .ok_or_else(|| LoadError::Parse(format!("unknown texture id: {}", id)));
        }
        let reflectance = props.float("reflectance").unwrap_or(DEFAULT_REFLECTANCE);
        self.textures.push(Texture::Constant(ConstantTexture::from_gray(reflectance)));
        Ok(self.textures.len() - 1)
    }

    fn add_bsdf(&mut self, entity: PendingEntity) -> Result<(), LoadError> {
        let id = entity.id.clone().unwrap_or_else(|| format!("bsdf_{}", self.materials.len()));
        let props = &entity.props;
        let alpha = props.float("alpha").unwrap_or(DEFAULT_ALPHA);
        let material = match entity.type_name.as_str() {
            "diffuse" => Material::Diffuse(DiffuseMaterial::new(self.reflectance_slot(props)?)),
            "roughconductor" => {
                let eta = props.spectrum("eta").ok_or(LoadError::MissingField("eta"))?;
                let k = props.spectrum("k").ok_or(LoadError::MissingField("k"))?;
                Material::RoughConductor(RoughConductorMaterial::new(alpha, eta, k))
            }
            "roughplastic" => {
                let int_ior = props.spectrum("int_ior").unwrap_or(Spectrum::Constant(DEFAULT_INT_IOR));
                let ext_ior = props.spectrum("ext_ior").unwrap_or(Spectrum::Constant(DEFAULT_EXT_IOR));
                let slot = self.reflectance_slot(props)?;
                Material::RoughPlastic(RoughPlasticMaterial::new(alpha, int_ior, ext_ior, slot))
            }
            other => return Err(LoadError::Parse(format!("unsupported bsdf type: {}", other))),
        };
        log::debug!("SceneLoader: bsdf {} ({}).", id, material.name());
        self.materials.push((id, material));
        Ok(())
    }

    fn add_emitter(&mut self, entity: PendingEntity) -> Result<(), LoadError> {
        match entity.type_name.as_str() {
            "area" => {
                let shape_index = entity.shape.ok_or(LoadError::MissingField("shape"))?;
                let radiance = entity.props.spectrum("radiance").ok_or(LoadError::MissingField("radiance"))?;
                log::debug!("SceneLoader: area emitter on shape {}.", shape_index);
                self.lights.push(Light::new(Emitter::new(radiance), shape_index));
            }
            "envmap" => {
                let filename = entity.props.strings.get("filename").ok_or(LoadError::MissingField("filename"))?;
                let path = self.resolve_path(filename)?;
                let scale = entity.props.float("scale").unwrap_or(1.0);
                let to_world = entity.props.matrix.unwrap_or_default();
                if self.envmap.is_some() {
                    log::warn!("SceneLoader: more than one envmap, keeping the last one.");
                }
                self.envmap = Some(EnvironmentMap::from_file(&path, to_world, scale)?);
            }
            other => return Err(LoadError::Parse(format!("unsupported emitter type: {}", other))),
        }
        Ok(())
    }

    fn finish(self) -> Result<SceneDescription, LoadError> {
        if let Some(entity) = self.pending {
            return Err(LoadError::Parse(format!("unterminated {:?} element", entity.kind)));
        }
        let light_sampler = LightSampler::new(&self.lights);
        log::info!("Scene description loaded: {} textures, {} materials, {} lights, envmap: {}.",
                   self.textures.len(), self.materials.len(), self.lights.len(), self.envmap.is_some());
        Ok(SceneDescription {
            textures: self.textures,
            materials: self.materials,
            lights: self.lights,
            envmap: self.envmap,
            light_sampler,
            sample_count: self.sample_count,
        })
    }
}

fn is_entity_tag(tag: &[u8]) -> bool {
    matches!(tag, b"texture" | b"bsdf" | b"emitter")
}

fn read_attributes(e: &BytesStart, defaults: &HashMap<String, String>) -> Result<HashMap<String, String>, LoadError> {
    let mut attrs = HashMap::new();
    for attr in e.attributes().flatten() {
        let key = String::from_utf8_lossy(attr.key.as_ref()).to_string();
        let value = attr.unescape_value()?;
        attrs.insert(key, resolve_value(&value, defaults));
    }
    Ok(attrs)
}

fn required<'a>(attrs: &'a HashMap<String, String>, field: &'static str) -> Result<&'a str, LoadError> {
    attrs.get(field).map(|s| s.as_str()).ok_or(LoadError::MissingField(field))
}

/// Substitutes `$name` references; longer names first so `$a` never
/// clobbers `$ab`.
fn resolve_value(raw: &str, defaults: &HashMap<String, String>) -> String {
    if !raw.contains('$') {
        return raw.to_string();
    }
    let mut keys: Vec<&String> = defaults.keys().collect();
    keys.sort_by(|a, b| b.len().cmp(&a.len()));
    let mut out = raw.to_string();
    for k in keys {
        out = out.replace(&format!("${}", k), &defaults[k]);
    }
    out
}

fn parse_float(value: &str) -> Result<Float, LoadError> {
    value.trim().parse::<Float>().map_err(|_| LoadError::Parse(format!("invalid float: {}", value)))
}

fn parse_usize(value: &str) -> Result<usize, LoadError> {
    value.trim().parse::<usize>().map_err(|_| LoadError::Parse(format!("invalid integer: {}", value)))
}

/// Either a single value or comma separated `lambda:value` pairs.
fn parse_spectrum(value: &str) -> Result<Spectrum, LoadError> {
    if !value.contains(':') {
        return Ok(Spectrum::Constant(parse_float(value)?));
    }
    let mut samples = Vec::new();
    for pair in value.split(',').map(|s| s.trim()).filter(|s| !s.is_empty()) {
        let mut parts = pair.split(':');
        let lambda = parts.next().ok_or_else(|| LoadError::Parse(format!("invalid spectrum entry: {}", pair)))?;
        let v = parts.next().ok_or_else(|| LoadError::Parse(format!("invalid spectrum entry: {}", pair)))?;
        samples.push((parse_float(lambda)?, parse_float(v)?));
    }
    if samples.is_empty() {
        return Err(LoadError::Parse(format!("empty spectrum: {}", value)));
    }
    Ok(Spectrum::piecewise_linear(samples))
}

/// Sixteen values, row major, separated by spaces or commas.
fn parse_matrix(value: &str) -> Result<Transform, LoadError> {
    let values = value
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .map(parse_float)
        .collect::<Result<Vec<Float>, LoadError>>()?;
    let count = values.len();
    let values: [Float; 16] = values
        .try_into()
        .map_err(|_| LoadError::Parse(format!("matrix needs 16 values, got {}", count)))?;
    Ok(Transform::from_row_slice(&values))
}
