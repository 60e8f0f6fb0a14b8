//! GLSL sources for the ASCII pipeline.
//!
//! A single program: a full-screen triangle strip (positions generated from
//! `gl_VertexID`, no vertex buffers) and a fragment shader that samples the
//! source at each cell center, picks a glyph from the atlas by luminance and
//! composes the effect highlights.

use serde::{Deserialize, Serialize};

use crate::effects::{MAX_RIPPLES, MAX_TRAIL_LENGTH};

/// Distance (normalized units) a ripple front travels per second per unit
/// of `u_rippleSpeed`.
pub const RIPPLE_RADIUS_SCALE: f32 = 0.01;

/// GLSL dialect to emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShaderDialect {
    /// GLSL ES 3.00 (WebGL2, GLES 3)
    #[default]
    Gles300,
    /// Desktop GLSL 3.30 core
    Glsl330,
}

impl ShaderDialect {
    fn header(self) -> &'static str {
        match self {
            ShaderDialect::Gles300 => "#version 300 es\nprecision highp float;\nprecision highp int;\n",
            ShaderDialect::Glsl330 => "#version 330 core\n",
        }
    }
}

const VERTEX_BODY: &str = r#"
out vec2 v_texCoord;

void main() {
    vec2 corner = vec2(float(gl_VertexID & 1), float((gl_VertexID >> 1) & 1));
    // Row 0 of the uploaded source is the top of the picture.
    v_texCoord = vec2(corner.x, 1.0 - corner.y);
    gl_Position = vec4(corner * 2.0 - 1.0, 0.0, 1.0);
}
"#;

const FRAGMENT_BODY: &str = r#"
in vec2 v_texCoord;
out vec4 fragColor;

uniform sampler2D u_video;
uniform sampler2D u_asciiAtlas;
uniform vec2 u_resolution;
uniform vec2 u_charSize;
uniform vec2 u_gridSize;
uniform float u_numChars;
uniform int u_colored;
uniform float u_blend;
uniform float u_highlight;
uniform float u_brightness;
uniform int u_ditherMode;

uniform vec2 u_mouse;
uniform float u_mouseRadius;
uniform int u_trailLength;
uniform vec2 u_trail[MAX_TRAIL_LENGTH];

uniform float u_time;
uniform int u_rippleEnabled;
uniform float u_rippleSpeed;
uniform vec3 u_ripples[MAX_RIPPLES];

uniform float u_audioLevel;
uniform float u_audioReactivity;
uniform float u_audioSensitivity;

const float BAYER4[16] = float[16](
     0.0,  8.0,  2.0, 10.0,
    12.0,  4.0, 14.0,  6.0,
     3.0, 11.0,  1.0,  9.0,
    15.0,  7.0, 13.0,  5.0
);

float luminance(vec3 color) {
    return dot(color, vec3(0.299, 0.587, 0.114));
}

float hash(vec2 p) {
    return fract(sin(dot(p, vec2(12.9898, 78.233))) * 43758.5453);
}

float ditherOffset(vec2 cell) {
    if (u_ditherMode == 1) {
        int index = int(mod(cell.x, 4.0)) + int(mod(cell.y, 4.0)) * 4;
        return (BAYER4[index] + 0.5) / 16.0 - 0.5;
    }
    if (u_ditherMode == 2) {
        return hash(cell + fract(u_time) * 61.0) - 0.5;
    }
    return 0.0;
}

vec2 aspectCorrect(vec2 p) {
    return vec2(p.x * u_resolution.x / max(u_resolution.y, 1.0), p.y);
}

float trailInfluence(vec2 uv) {
    if (u_mouseRadius <= 0.0) {
        return 0.0;
    }
    vec2 here = aspectCorrect(uv);
    float influence = 0.0;
    if (u_mouse.x >= 0.0) {
        float d = distance(here, aspectCorrect(u_mouse));
        influence = 1.0 - smoothstep(0.0, u_mouseRadius, d);
    }
    for (int i = 0; i < MAX_TRAIL_LENGTH; i++) {
        if (i >= u_trailLength) {
            break;
        }
        vec2 point = u_trail[i];
        if (point.x < 0.0) {
            continue;
        }
        // Oldest entry first: fade and shrink towards the tail.
        float fade = float(i + 1) / float(u_trailLength);
        float radius = u_mouseRadius * fade;
        float d = distance(here, aspectCorrect(point));
        influence = max(influence, fade * (1.0 - smoothstep(0.0, radius, d)));
    }
    return influence;
}

float rippleInfluence(vec2 uv) {
    if (u_rippleEnabled == 0) {
        return 0.0;
    }
    vec2 here = aspectCorrect(uv);
    float total = 0.0;
    for (int i = 0; i < MAX_RIPPLES; i++) {
        vec3 ripple = u_ripples[i];
        if (ripple.z < 0.0) {
            continue;
        }
        float age = u_time - ripple.z;
        if (age < 0.0) {
            continue;
        }
        float radius = age * u_rippleSpeed * RIPPLE_RADIUS_SCALE;
        float d = distance(here, aspectCorrect(ripple.xy));
        float ring = 1.0 - smoothstep(0.0, RIPPLE_WIDTH, abs(d - radius));
        float fade = 1.0 - clamp(radius / RIPPLE_MAX_RADIUS, 0.0, 1.0);
        total += ring * fade;
    }
    return clamp(total, 0.0, 1.0);
}

void main() {
    vec2 grid = max(u_gridSize, vec2(1.0));
    vec2 cell = floor(v_texCoord * grid);
    vec2 cellUV = fract(v_texCoord * grid);
    vec2 center = (cell + 0.5) / grid;

    vec3 source = texture(u_video, center).rgb;
    float lum = clamp(luminance(source) * u_brightness, 0.0, 1.0);

    // Contrast curve, blended in by the highlight amount.
    lum = mix(lum, smoothstep(0.0, 1.0, lum), clamp(u_highlight, 0.0, 1.0));

    float audio = u_audioLevel * u_audioReactivity;
    lum = clamp(lum * (1.0 + audio), 0.0, 1.0);

    float effect = max(trailInfluence(center), rippleInfluence(center));
    effect *= 1.0 + u_audioLevel * u_audioSensitivity;
    lum = clamp(lum + effect * 0.5, 0.0, 1.0);

    float levels = max(u_numChars, 1.0);
    float scaled = lum * (levels - 1.0);
    float index = clamp(floor(scaled + 0.5 + ditherOffset(cell)), 0.0, levels - 1.0);

    // Atlas is a 1xN strip of glyph cells.
    vec2 atlasUV = vec2((index + cellUV.x) / levels, cellUV.y);
    float glyph = texture(u_asciiAtlas, atlasUV).a;

    vec3 tint = u_colored == 1 ? clamp(source * u_brightness, 0.0, 1.0) : vec3(lum);
    tint = clamp(tint + effect * 0.25, 0.0, 1.0);

    vec3 color = tint * glyph;
    color = mix(color, clamp(source * u_brightness, 0.0, 1.0), clamp(u_blend, 0.0, 1.0) * (1.0 - glyph));

    fragColor = vec4(color, 1.0);
}
"#;

/// Vertex shader source for `dialect`.
pub fn vertex_source(dialect: ShaderDialect) -> String {
    format!("{}{}", dialect.header(), VERTEX_BODY)
}

/// Fragment shader source for `dialect`, with array capacities baked in.
pub fn fragment_source(dialect: ShaderDialect) -> String {
    format!(
        "{}#define MAX_TRAIL_LENGTH {}\n#define MAX_RIPPLES {}\n#define RIPPLE_RADIUS_SCALE {:.4}\n#define RIPPLE_WIDTH 0.02\n#define RIPPLE_MAX_RADIUS 0.6\n{}",
        dialect.header(),
        MAX_TRAIL_LENGTH,
        MAX_RIPPLES,
        RIPPLE_RADIUS_SCALE,
        FRAGMENT_BODY
    )
}
