pub mod br3d;
