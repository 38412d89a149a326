// Wire layout between the WASM core and the JS scene host.
//
// Beams cross the boundary as flat `Float32Array`s of line-strip vertices;
// raycast results come back packed the same way.

// Floats per beam vertex: position xyz + color rgba
pub const VERTEX_FLOATS: usize = 7;

// Floats per raycast hit: point xyz, normal xyz, object id, distance
pub const HIT_STRIDE: usize = 8;
pub const HIT_POINT: usize = 0;
pub const HIT_NORMAL: usize = 3;
pub const HIT_OBJECT: usize = 6;
pub const HIT_DISTANCE: usize = 7;

// Floats per model triangle in `setModel`
pub const TRIANGLE_FLOATS: usize = 9;

// Host object method names
pub const HOST_ADD_BEAM: &str = "addBeam";
pub const HOST_UPDATE_BEAM: &str = "updateBeam";
pub const HOST_REMOVE_BEAM: &str = "removeBeam";
pub const HOST_RAYCAST: &str = "raycast";
pub const HOST_SET_HELPERS: &str = "setHelpersVisible";

// localStorage namespace
pub const STORAGE_NAMESPACE: &str = "laser";
