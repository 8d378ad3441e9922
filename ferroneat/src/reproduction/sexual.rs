use crate::genomics::{Genome, IdSequences, Model};
use crate::reproduction::{GeneListBuilder, SexualReproductionSettings};

use rand::Rng;

/// Sexual reproduction: uniform crossover on innovation-aligned genes.
///
/// One parent is randomly designated primary. The two gene arrays are
/// walked together by innovation number: genes present on both parents are
/// copied from either with equal probability, genes present only on the
/// primary parent are always copied, and genes present only on the
/// secondary parent are copied with the configured probability, subject to
/// the [`GeneListBuilder`]'s duplicate and cycle checks.
#[derive(Debug)]
pub struct SexualReproduction {
    settings: SexualReproductionSettings,
    builder: GeneListBuilder,
}

impl SexualReproduction {
    pub fn new(settings: SexualReproductionSettings) -> SexualReproduction {
        SexualReproduction {
            settings,
            builder: GeneListBuilder::new(),
        }
    }

    pub fn create_child(
        &mut self,
        parent1: &Genome,
        parent2: &Genome,
        model: &Model,
        ids: &IdSequences,
        generation: u32,
        rng: &mut impl Rng,
    ) -> Genome {
        let (primary, secondary) = if rng.gen::<bool>() {
            (parent1, parent2)
        } else {
            (parent2, parent1)
        };

        self.builder.begin(model, primary.genes());

        let primary_genes = primary.genes().as_slice();
        let secondary_genes = secondary.genes().as_slice();
        let (mut p, mut s) = (0, 0);
        while p < primary_genes.len() || s < secondary_genes.len() {
            match (primary_genes.get(p), secondary_genes.get(s)) {
                (Some(pg), Some(sg)) if pg.innovation == sg.innovation => {
                    // Homologous pair: same innovation implies the same
                    // endpoints; only the weight differs.
                    debug_assert_eq!((pg.source, pg.target), (sg.source, sg.target));
                    self.builder
                        .add_primary(if rng.gen::<bool>() { *pg } else { *sg });
                    p += 1;
                    s += 1;
                }
                (Some(pg), Some(sg)) if pg.innovation < sg.innovation => {
                    self.builder.add_primary(*pg);
                    p += 1;
                }
                (Some(pg), None) => {
                    self.builder.add_primary(*pg);
                    p += 1;
                }
                (_, Some(sg)) => {
                    if rng.gen::<f64>() < self.settings.secondary_parent_gene_probability {
                        self.builder.try_add_secondary(*sg);
                    }
                    s += 1;
                }
                (None, None) => unreachable!(),
            }
        }

        Genome::new(ids.next_genome_id(), generation, self.builder.finish())
    }
}
