use std::path::PathBuf;

use clap::Parser;
use dorm_viewer::{
    context::Context, data_structures::material::UniformSpec, flow, gpu::Gpu, settings::Settings,
};

/// Texture name and file for every texture in the room.
const TEXTURES: &[(&str, &str)] = &[
    ("grid", "grid.png"),
    ("chair_one_tex", "CHAIR_ONE_TEX.png"),
    ("chair_2_tex", "CHAIR_2_TEX.png"),
    ("wall_tex", "WALL_TEX.png"),
    ("celling_tex", "CELLING_TEX.png"),
    ("floor_tex", "FLOOR_TEX.png"),
    ("table_tex", "TABLE_TEX.png"),
    ("papers_1_tex", "PAPERS_1_TEX.png"),
];

/// Material name and the texture it samples.
const MATERIALS: &[(&str, &str)] = &[
    ("default_material", "grid"),
    ("chair_one", "chair_one_tex"),
    ("chair_two", "chair_2_tex"),
    ("wall", "wall_tex"),
    ("celling", "celling_tex"),
    ("floor", "floor_tex"),
    ("table", "table_tex"),
    ("papers_1", "papers_1_tex"),
];

/// Mesh file and the material it is drawn with.
const MESHES: &[(&str, &str)] = &[
    ("CHAIR_ONE.obj", "chair_one"),
    ("CHAIR_2.obj", "chair_two"),
    ("WALL.obj", "wall"),
    ("CELLING.obj", "celling"),
    ("FLOOR.obj", "floor"),
    ("TABLE.obj", "table"),
    ("PAPERS_1.obj", "papers_1"),
];

const SHADER: &str = "default_shader";

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Fly through a textured dormitory room (WASD/EQ move, hold left mouse to look)."
)]
struct Args {
    /// Directory holding the room's textures, meshes and shaders
    #[arg(long, default_value = "assets")]
    assets: PathBuf,
    #[arg(long, default_value_t = 1280)]
    width: u32,
    #[arg(long, default_value_t = 720)]
    height: u32,
    /// Frame rate limit, 0 for unlimited
    #[arg(long, default_value_t = 60)]
    fps: u32,
    /// MSAA sample count, 1 to disable. Unsupported counts fall back to 1.
    #[arg(long, default_value_t = 4)]
    msaa: u32,
    #[arg(long)]
    no_vsync: bool,
}

impl From<Args> for Settings {
    fn from(args: Args) -> Self {
        Settings {
            window_size: (args.width, args.height),
            fps_limit: args.fps,
            msaa_samples: args.msaa,
            vsync: !args.no_vsync,
            asset_root: args.assets,
            ..Settings::default()
        }
    }
}

fn load_assets(ctx: &mut Context<Gpu>, settings: &Settings) -> anyhow::Result<()> {
    for (name, file) in TEXTURES {
        ctx.load_texture(name, settings.asset(file))?;
    }

    ctx.load_shader(
        SHADER,
        settings.asset("shaders/default.vert.wgsl"),
        settings.asset("shaders/default.frag.wgsl"),
    )?;

    for (name, texture) in MATERIALS {
        ctx.create_material(name, SHADER, UniformSpec::new().texture("texture", texture, 0))?;
    }

    for (file, material) in MESHES {
        let mesh = ctx.load_mesh(settings.asset(file))?;
        mesh.material_name = material.to_string();
    }

    ctx.compile_shaders()?;
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let settings = Settings::from(Args::parse());
    flow::run(settings, Box::new(load_assets))
}
