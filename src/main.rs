// Copyright 2020 TwoCookingMice

use indicatif::{ ProgressBar, ProgressStyle };

use macaron::core::rng::LcgRng;
use macaron::core::scene_loader::{ load_scene_description, SceneDescription };
use macaron::integrators::furnace::{ check_sample_pdf_consistency, direction_at_angle,
                                     estimate_albedo, estimate_envmap_irradiance,
                                     estimate_pdf_integral };
use macaron::io::exr_utils;
use macaron::math::constants::{ Float, Vector2f, Vector3f };
use macaron::math::spectrum::SampledLambdas;

use std::env;

const INCIDENCE_ANGLES: [Float; 4] = [0.0, 30.0, 60.0, 80.0];
const DEFAULT_SAMPLES: usize = 4096;

fn main() {
    env::set_var("RUST_LOG", "info");
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <scene.xml> [--samples N] [--seed N] [--pdf-image out.exr]", args[0]);
        std::process::exit(1);
    }

    let input_path = &args[1];
    let mut samples_override: Option<usize> = None;
    let mut seed: u64 = 0;
    let mut pdf_image_path: Option<String> = None;

    let mut i = 2;
    while i < args.len() {
        match args[i].as_str() {
            "--samples" => {
                i += 1;
                samples_override = args.get(i).and_then(|v| v.parse::<usize>().ok());
            }
            "--seed" => {
                i += 1;
                seed = args.get(i).and_then(|v| v.parse::<u64>().ok()).unwrap_or(0);
            }
            "--pdf-image" => {
                i += 1;
                pdf_image_path = args.get(i).cloned();
            }
            other => log::warn!("Ignoring unknown argument {}.", other),
        }
        i += 1;
    }

    let scene = match load_scene_description(input_path) {
        Ok(scene) => scene,
        Err(err) => {
            eprintln!("failed to load {}: {}", input_path, err);
            std::process::exit(1);
        }
    };
    let sample_count = samples_override.or(scene.sample_count).unwrap_or(DEFAULT_SAMPLES);
    let mut rng = LcgRng::new(seed);

    report_lights(&scene);
    report_materials(&scene, sample_count, &mut rng);
    report_envmap(&scene, sample_count, &mut rng);

    if let (Some(path), Some(envmap)) = (pdf_image_path, scene.envmap.as_ref()) {
        if let Err(err) = exr_utils::write_exr_to_file(&envmap.pdf_image(), &path) {
            eprintln!("failed to write {}: {}", path, err);
            std::process::exit(1);
        }
    }
}

fn report_lights(scene: &SceneDescription) {
    for (id, light) in scene.lights.iter().enumerate() {
        log::info!("Light {} on shape {}: power {:.4}, selection probability {:.4}.",
                   id, light.shape_index, light.emitter.power(),
                   scene.light_sampler.light_sample_pdf(id));
    }
}

fn report_materials(scene: &SceneDescription, sample_count: usize, rng: &mut LcgRng) {
    let total = scene.materials.len() * INCIDENCE_ANGLES.len();
    if total == 0 {
        return;
    }
    let progress = ProgressBar::new(total as u64);
    progress.set_style(
        ProgressStyle::with_template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} furnace runs")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );

    let ctx = scene.bsdf_context(Vector2f::new(0.5, 0.5));
    let mut lines = Vec::with_capacity(total);
    for (id, material) in scene.materials.iter() {
        for &angle in INCIDENCE_ANGLES.iter() {
            let wo = direction_at_angle(angle);
            let lambdas = SampledLambdas::new_uniform(rng.next_f32());
            let albedo = estimate_albedo(material, &ctx, &wo, &lambdas, sample_count, rng);
            let consistency = check_sample_pdf_consistency(material, &ctx, &wo, &lambdas, sample_count, rng);
            let pdf_integral = estimate_pdf_integral(material, &wo, &lambdas, sample_count, rng);
            lines.push(format!(
                "{} ({}) at {:>4.1} deg: albedo {:.4}, pdf integral {:.4}, rejected {}/{}, max pdf error {:.2e}",
                id, material.name(), angle, albedo.average(), pdf_integral,
                consistency.rejected, sample_count, consistency.max_relative_error));
            if !consistency.is_consistent(1e-3) {
                log::warn!("Material {} reports inconsistent sample and pdf densities.", id);
            }
            progress.inc(1);
        }
    }
    progress.finish();

    for line in lines {
        log::info!("{}", line);
    }
}

fn report_envmap(scene: &SceneDescription, sample_count: usize, rng: &mut LcgRng) {
    let envmap = match scene.envmap.as_ref() {
        Some(envmap) => envmap,
        None => return,
    };

    let up = Vector3f::new(0.0, 1.0, 0.0);
    let irradiance = estimate_envmap_irradiance(envmap, &up, sample_count, rng);
    log::info!("Envmap {}x{}: irradiance at +y ({:.4}, {:.4}, {:.4}).",
               envmap.width(), envmap.height(), irradiance.r(), irradiance.g(), irradiance.b());

    let mut worst: Float = 0.0;
    let mut skipped = 0usize;
    for _ in 0..sample_count {
        let s = envmap.sample(&rng.next_vec2());
        if s.pdf <= 0.0 {
            skipped += 1;
            continue;
        }
        worst = worst.max((envmap.pdf(&s.direction) - s.pdf).abs() / s.pdf);
    }
    log::info!("Envmap sample/pdf agreement: max relative error {:.2e}, {} empty samples.", worst, skipped);
}
