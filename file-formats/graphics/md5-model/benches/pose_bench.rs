use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use glam::{Vec2, Vec3};
use md5_model::animation::{HierarchySolver, ParentChainSolver, Pose, PoseJoint, TopDownSolver};
use md5_model::math::quat_from_xyz;
use md5_model::skinning::{SkinnedMesh, Skinner};
use md5_model::{JointMatrix, Mesh, Triangle, Vertex, Weight};
use std::hint::black_box;

/// A single chain of `count` joints, each offset and slightly twisted from its parent
fn create_chain(count: usize) -> Pose {
    Pose {
        joints: (0..count)
            .map(|i| PoseJoint {
                parent: i.checked_sub(1),
                translation: Vec3::new(0.0, 0.0, 1.0),
                orientation: quat_from_xyz(Vec3::new(0.05, 0.02, 0.01)),
            })
            .collect(),
    }
}

/// A grid of `size * size` vertices, each split between two neighbouring joints
fn create_grid(size: usize, joints: usize) -> Mesh {
    let mut mesh = Mesh {
        shader: "bench/grid".to_string(),
        ..Mesh::default()
    };

    for y in 0..size {
        for x in 0..size {
            let i = y * size + x;
            let joint = i % (joints - 1);
            mesh.vertices.push(Vertex {
                uv: Vec2::new(x as f32, y as f32) / size as f32,
                first_weight: mesh.weights.len(),
                weight_count: 2,
            });
            for (offset, bias) in [(0, 0.7), (1, 0.3)] {
                mesh.weights.push(Weight {
                    joint: joint + offset,
                    bias,
                    position: Vec3::new(x as f32, y as f32, 0.0),
                });
            }
        }
    }

    for y in 0..size - 1 {
        for x in 0..size - 1 {
            let i = (y * size + x) as u32;
            let s = size as u32;
            mesh.triangles.push(Triangle {
                indices: [i, i + s, i + 1],
            });
            mesh.triangles.push(Triangle {
                indices: [i + 1, i + s, i + s + 1],
            });
        }
    }

    mesh
}

fn bench_hierarchy(c: &mut Criterion) {
    let mut group = c.benchmark_group("hierarchy");
    for count in [16, 64, 128] {
        let pose = create_chain(count);
        let mut out = Vec::with_capacity(count);

        group.bench_with_input(BenchmarkId::new("parent_chain", count), &pose, |b, pose| {
            b.iter(|| ParentChainSolver.solve(black_box(pose), &mut out).unwrap());
        });
        group.bench_with_input(BenchmarkId::new("top_down", count), &pose, |b, pose| {
            b.iter(|| TopDownSolver.solve(black_box(pose), &mut out).unwrap());
        });
    }
    group.finish();
}

fn bench_skinning(c: &mut Criterion) {
    let joints = 64;
    let pose = create_chain(joints);
    let mut matrices: Vec<JointMatrix> = Vec::new();
    TopDownSolver.solve(&pose, &mut matrices).unwrap();

    let mesh = create_grid(64, joints);
    let skinner = Skinner::default();
    let mut out = SkinnedMesh::default();

    c.bench_function("skin_mesh_4096_vertices", |b| {
        b.iter(|| {
            skinner
                .skin_mesh(black_box(&mesh), black_box(&matrices), &mut out)
                .unwrap()
        })
    });
}

criterion_group!(benches, bench_hierarchy, bench_skinning);
criterion_main!(benches);
