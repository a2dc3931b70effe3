use bytemuck::{Pod, Zeroable};
use flare_particles::backend::names;
use glam::{Mat4, Vec3, Vec4};

/// Per-draw uniform block (192 bytes):
///
///  offset   0  view          mat4x4<f32>
///  offset  64  projection    mat4x4<f32>
///  offset 128  start_color   vec4<f32>
///  offset 144  end_color     vec4<f32>
///  offset 160  acceleration  vec3<f32>
///  offset 172  current_time  f32
///  offset 176  start_size    f32
///  offset 180  end_size      f32
///  offset 184  lifetime      f32
///  offset 188  fade_out      f32
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct ParticleUniforms {
    pub view: [[f32; 4]; 4],
    pub projection: [[f32; 4]; 4],
    pub start_color: [f32; 4],
    pub end_color: [f32; 4],
    pub acceleration: [f32; 3],
    pub current_time: f32,
    pub start_size: f32,
    pub end_size: f32,
    pub lifetime: f32,
    pub fade_out: f32,
}

impl Default for ParticleUniforms {
    fn default() -> Self {
        Self {
            view: Mat4::IDENTITY.to_cols_array_2d(),
            projection: Mat4::IDENTITY.to_cols_array_2d(),
            start_color: [1.0; 4],
            end_color: [1.0; 4],
            acceleration: [0.0; 3],
            current_time: 0.0,
            start_size: 0.1,
            end_size: 0.1,
            lifetime: 1.0,
            fade_out: 1.0,
        }
    }
}

// Setters return `false` for names this block has no field for.
impl ParticleUniforms {
    pub fn set_matrix4(&mut self, name: &str, value: Mat4) -> bool {
        let slot = match name {
            names::VIEW => &mut self.view,
            names::PROJECTION => &mut self.projection,
            _ => return false,
        };
        *slot = value.to_cols_array_2d();
        true
    }

    pub fn set_float(&mut self, name: &str, value: f32) -> bool {
        let slot = match name {
            names::CURRENT_TIME => &mut self.current_time,
            names::START_SIZE => &mut self.start_size,
            names::END_SIZE => &mut self.end_size,
            names::LIFETIME => &mut self.lifetime,
            names::FADE_OUT => &mut self.fade_out,
            _ => return false,
        };
        *slot = value;
        true
    }

    pub fn set_float3(&mut self, name: &str, value: Vec3) -> bool {
        match name {
            names::ACCELERATION => self.acceleration = value.to_array(),
            _ => return false,
        }
        true
    }

    pub fn set_float4(&mut self, name: &str, value: Vec4) -> bool {
        let slot = match name {
            names::START_COLOR => &mut self.start_color,
            names::END_COLOR => &mut self.end_color,
            _ => return false,
        };
        *slot = value.to_array();
        true
    }
}
