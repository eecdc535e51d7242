//! Glint CLI
//!
//! Command-line tools for the Glint toolkit:
//! - `glint check` compiles and links a WGSL shader pair and lists its inputs
//! - `glint mat3` composes 2D transforms
//! - `glint ease` samples an eased animation
//! - `glint quad` prints sprite quad vertices

mod config;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use glint_animation::{Animator, Clock, Easing, ManualClock};
use glint_core::Mat3;
use glint_gpu::{quad_floats, RecordingContext, RenderContext, ShaderProgram, WgpuContext};
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::GlintConfig;

#[derive(Parser)]
#[command(name = "glint", version, about = "Glint 2D rendering toolkit")]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to a glint.toml (defaults to ./glint.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile and link a WGSL vertex/fragment pair
    Check {
        /// Vertex shader source
        vertex: PathBuf,
        /// Fragment shader source
        fragment: PathBuf,
        /// Vertex entry point (default: first @vertex function)
        #[arg(long)]
        vertex_entry: Option<String>,
        /// Fragment entry point (default: first @fragment function)
        #[arg(long)]
        fragment_entry: Option<String>,
        /// Also create the program on a headless GPU device
        #[arg(long)]
        gpu: bool,
    },

    /// Compose transforms such as `translate:5,7 rotate:0.5 scale:2,2`.
    ///
    /// Matrices are multiplied left to right, so the last one is applied to
    /// points first.
    Mat3 {
        #[arg(value_parser = parse_transform)]
        transforms: Vec<Mat3>,
        /// Print the inverse of the composed matrix
        #[arg(long)]
        invert: bool,
        /// Transform a point given as X,Y
        #[arg(long, value_parser = parse_pair, allow_hyphen_values = true)]
        point: Option<(f32, f32)>,
    },

    /// Sample an eased animation from start to end
    Ease {
        #[arg(long, allow_negative_numbers = true)]
        from: f32,
        #[arg(long, allow_negative_numbers = true)]
        to: f32,
        /// Duration in milliseconds
        #[arg(long)]
        duration: f32,
        /// Number of intervals to sample
        #[arg(long)]
        steps: Option<u32>,
        /// Easing curve name, e.g. ease-out-quart or linear
        #[arg(long)]
        easing: Option<String>,
    },

    /// Print the six vertices of a textured quad as x, y, u, v
    Quad {
        #[arg(allow_negative_numbers = true)]
        x: f32,
        #[arg(allow_negative_numbers = true)]
        y: f32,
        w: f32,
        h: f32,
        tex_w: f32,
        tex_h: f32,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .with_target(false)
        .init();

    let config = GlintConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Check {
            vertex,
            fragment,
            vertex_entry,
            fragment_entry,
            gpu,
        } => cmd_check(&config, &vertex, &fragment, vertex_entry, fragment_entry, gpu),
        Commands::Mat3 {
            transforms,
            invert,
            point,
        } => cmd_mat3(&transforms, invert, point),
        Commands::Ease {
            from,
            to,
            duration,
            steps,
            easing,
        } => cmd_ease(&config, from, to, duration, steps, easing),
        Commands::Quad {
            x,
            y,
            w,
            h,
            tex_w,
            tex_h,
        } => {
            for vertex in quad_floats(x, y, w, h, tex_w, tex_h).chunks_exact(4) {
                println!("{}, {}, {}, {}", vertex[0], vertex[1], vertex[2], vertex[3]);
            }
            Ok(())
        }
    }
}

fn cmd_check(
    config: &GlintConfig,
    vertex: &Path,
    fragment: &Path,
    vertex_entry: Option<String>,
    fragment_entry: Option<String>,
    gpu: bool,
) -> Result<()> {
    let vertex_source = fs::read_to_string(vertex)
        .with_context(|| format!("Failed to read {}", vertex.display()))?;
    let fragment_source = fs::read_to_string(fragment)
        .with_context(|| format!("Failed to read {}", fragment.display()))?;

    let mut program_config = config.program_config().apply_env_overrides();
    program_config.label = vertex
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned());
    if vertex_entry.is_some() {
        program_config.vertex_entry = vertex_entry;
    }
    if fragment_entry.is_some() {
        program_config.fragment_entry = fragment_entry;
    }

    let program = if gpu {
        let mut ctx = WgpuContext::headless().context("Failed to create a headless GPU context")?;
        build_program(&mut ctx, &vertex_source, &fragment_source, &program_config)?
    } else {
        let mut ctx = RecordingContext::new();
        build_program(&mut ctx, &vertex_source, &fragment_source, &program_config)?
    };

    let shaders = program.shaders();
    println!("ok: {} -> {}", shaders.vertex_entry(), shaders.fragment_entry());

    println!("uniforms:");
    for (name, slot) in program.uniforms() {
        println!("  {} +{:<4} {}: {}", slot.binding, slot.offset, name, slot.ty);
    }

    println!("attributes:");
    for attribute in program.attributes() {
        println!("  @location({}) {}", attribute.location, attribute.name);
    }

    Ok(())
}

fn build_program<C: RenderContext>(
    ctx: &mut C,
    vertex_source: &str,
    fragment_source: &str,
    config: &glint_gpu::ProgramConfig,
) -> Result<ShaderProgram> {
    let program = ShaderProgram::with_config(ctx, vertex_source, fragment_source, config)?;
    program.use_program(ctx);
    Ok(program)
}

fn cmd_mat3(transforms: &[Mat3], invert: bool, point: Option<(f32, f32)>) -> Result<()> {
    let mut matrix = match transforms {
        [] => Mat3::IDENTITY,
        [single] => *single,
        many => Mat3::multiply(many)?,
    };
    if invert {
        matrix = matrix.invert()?;
    }

    print!("{}", matrix);
    if let Some((x, y)) = point {
        let [tx, ty] = matrix.transform_point(x, y);
        println!("({}, {}) -> ({}, {})", x, y, tx, ty);
    }
    Ok(())
}

fn cmd_ease(
    config: &GlintConfig,
    from: f32,
    to: f32,
    duration: f32,
    steps: Option<u32>,
    easing: Option<String>,
) -> Result<()> {
    let name = easing.unwrap_or_else(|| config.ease.easing.clone());
    let easing = Easing::from_name(&name).with_context(|| {
        let known: Vec<_> = Easing::ALL.iter().map(Easing::name).collect();
        format!("Unknown easing `{}` (expected one of: {})", name, known.join(", "))
    })?;
    let steps = steps.unwrap_or(config.ease.steps).max(1);

    let clock = ManualClock::new();
    let mut animator = Animator::with_clock(clock.clone());
    animator.start_with_easing("value", from, to, duration, easing);

    let step_ms = duration.max(0.0) as f64 / steps as f64;
    for i in 0..=steps {
        if i > 0 {
            clock.advance(step_ms);
        }
        let value = animator.get("value");
        println!("{:>10.2} ms  {}", clock.now_ms(), value);
        if animator.finished() {
            break;
        }
    }
    Ok(())
}

fn parse_pair(s: &str) -> Result<(f32, f32), String> {
    let (a, b) = s
        .split_once(',')
        .ok_or_else(|| format!("expected X,Y but got `{}`", s))?;
    let a = a.trim().parse::<f32>().map_err(|e| e.to_string())?;
    let b = b.trim().parse::<f32>().map_err(|e| e.to_string())?;
    Ok((a, b))
}

fn parse_transform(s: &str) -> Result<Mat3, String> {
    let (kind, args) = s
        .split_once(':')
        .ok_or_else(|| format!("expected KIND:ARGS but got `{}`", s))?;
    match kind {
        "translate" => parse_pair(args).map(|(x, y)| Mat3::translation(x, y)),
        "scale" => parse_pair(args).map(|(x, y)| Mat3::scale(x, y)),
        "rotate" => args
            .trim()
            .parse::<f32>()
            .map(Mat3::rotation)
            .map_err(|e| e.to_string()),
        other => Err(format!(
            "unknown transform `{}` (expected translate, scale or rotate)",
            other
        )),
    }
}
