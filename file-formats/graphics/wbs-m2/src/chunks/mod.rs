//! Records stored in the blocks of an M2 model

pub mod attachment;
pub mod bone;
pub mod camera;
pub mod color;
pub mod event;
pub mod light;
pub mod material;
pub mod particle_emitter;
pub mod ribbon_emitter;
pub mod sequence;
pub mod texture;
pub mod vertex;

pub use attachment::{M2Attachment, M2AttachmentHeader};
pub use bone::{M2Bone, M2BoneFlags, M2BoneHeader};
pub use camera::{M2Camera, M2CameraHeader};
pub use color::{
    M2Color, M2ColorHeader, M2TextureTransform, M2TextureTransformHeader, M2TextureWeight, OPAQUE,
};
pub use event::{M2Event, M2EventHeader};
pub use light::{M2Light, M2LightHeader, light_type};
pub use material::{M2BlendMode, M2Material, M2RenderFlags};
pub use particle_emitter::{
    M2ParticleEmitter, M2ParticleEmitterHeader, M2ParticleFlags, M2ParticleMotion, emitter_type,
};
pub use ribbon_emitter::{M2RibbonEmitter, M2RibbonEmitterHeader};
pub use sequence::{M2Sequence, M2SequenceFlags};
pub use texture::{M2Texture, M2TextureFlags, M2TextureHeader, M2TextureType};
pub use vertex::M2Vertex;
