//! Builtin taxonomy definitions
//!
//! Taxonomies are authored in code and looked up by name. The Revit table groups
//! built-in category codes (`OST_*`) the way category selector components show them.

use super::{NodeDef, Taxonomy};
use crate::domain::{TaxonError, TaxonResult};

/// Registry name of the Revit built-in category grouping
pub const REVIT_CATEGORIES: &str = "revit-categories";

/// Names of every builtin taxonomy
pub const BUILTIN_TAXONOMIES: &[&str] = &[REVIT_CATEGORIES];

/// Retired categories, claimed by the hidden `Skip` group
const RETIRED: &[&str] = &[
    r".+Obsolete.*",
    r".+OBSOLETE.*",
    r".+Deprecated.*",
    r"OST_GbXML.*",
    r"OST_gbXML.*",
    r"OST_DSR_.*",
];

/// Claims of the `Openings` group
const OPENING_MARKS: &[&str] = &[r"OST_.+Opening", r"OST_Arc.*", r"OST_Shaft.*"];

/// Claims of the `Tags` group
const TAG_MARKS: &[&str] = &[r"OST_Tag.*", r"OST_.+Tags", r"OST_.+Labels"];

/// Claims of the `Annotation` group
const ANNOTATION_MARKS: &[&str] = &[
    r"OST_.+DownArrow.*",
    r"OST_.+DownText.*",
    r"OST_.+UpArrow.*",
    r"OST_.+UpText.*",
    r"OST_.+Annotation.*",
    r"OST_Callout.*",
    r"OST_Spot.*",
    r"OST_Cloud.*",
    r"OST_Elev.*",
    r"OST_Repeating.*",
    "OST_BrokenSectionLine",
    r"OST_Legend.*",
    r"OST_Detail.*",
    "OST_InvisibleLines",
    "OST_DemolishedLines",
    "OST_InsulationLines",
    "OST_FillPatterns",
    "OST_FilledRegion",
    "OST_HiddenLines",
    r"OST_Center.*",
    r"OST_Keynote.*",
    r"OST_Matchline.*",
    r"OST_Model.*",
    r"OST_.+Text.*",
    r"OST_.+Overhead.*",
    r"OST_Curve.*",
    r"OST_Dim.*",
    r"OST_Dimension.*",
    r"OST_Masking.*",
    r"OST_.+Tag.*",
    r"OST_.+Label.*",
    r"OST_.+Symbol.*",
    r"OST_.+TickMark.*",
    "OST_RevisionClouds",
];

/// Claims of the `Links` group
const LINK_MARKS: &[&str] = &[
    "OST_RvtLinks",
    "OST_TopographyLink",
    r"OST_Coordination.*",
    r"OST_PointCloud.*",
    r"OST_Raster.*",
];

/// Claims of the `Analysis` group
const ANALYSIS_MARKS: &[&str] = &[r"OST_.*Analy.*"];

/// Claims of the `Paths` group
const PATH_MARKS: &[&str] = &[r"OST_Path.*"];

/// Cut and projection styles are never grouped with their element category
const CUT_STYLES: &[&str] = &[r"OST_.+Cut.*", r"OST_.+Projection.*"];

/// Build a builtin taxonomy by name
pub fn builtin(name: &str) -> TaxonResult<Taxonomy> {
    match name {
        REVIT_CATEGORIES => revit_categories(),
        _ => Err(TaxonError::UnknownTaxonomy {
            name: name.to_string(),
            available: BUILTIN_TAXONOMIES.join(", "),
        }),
    }
}

/// The Revit built-in category grouping
///
/// Exclusive groups are visited in the order Skip, Openings, Tags, Annotation,
/// Links, Analysis, Paths, Materials. Each of them vetoes the claims of the
/// groups visited before it, so overlapping codes go to the earlier group
/// instead of raising a conflict.
pub fn revit_categories() -> TaxonResult<Taxonomy> {
    Taxonomy::new(
        REVIT_CATEGORIES,
        vec![
            NodeDef::new("Skip").exclusive(RETIRED.iter().copied()).hidden(),
            site(),
            NodeDef::new("References")
                .include([
                    r"OST_Grid.*",
                    r"OST_Level.*",
                    r"OST_Constraint.*",
                    r"OST_Reference.*",
                ])
                .exclude([r"OST_GridChains.*", r"OST_ReferencePoints.*", r"OST_ReferenceViewer.*"]),
            modeling(),
            drafting(),
            NodeDef::new("Containers").include([
                r"OST_Part.*",
                r"OST_Assemblies.*",
                r"OST_Group.*",
                r"OST_.+Groups",
            ]),
            NodeDef::new("Links")
                .exclusive(LINK_MARKS.iter().copied())
                .exclude(earlier_claims(&[OPENING_MARKS, TAG_MARKS, ANNOTATION_MARKS])),
            analysis(),
            rendering(),
        ],
    )
}

/// Retired codes plus the given claim groups
fn earlier_claims(groups: &[&[&'static str]]) -> Vec<&'static str> {
    let mut patterns = RETIRED.to_vec();
    for group in groups {
        patterns.extend(group.iter().copied());
    }
    patterns
}

fn site() -> NodeDef {
    NodeDef::new("Site")
        .include([
            r"OST_Site.*",
            r"OST_Sewer.*",
            r"OST_Road.*",
            r"OST_Building.*",
            r"OST_Contour.*",
            r"OST_Parking.*",
        ])
        .child(NodeDef::new("Topography").include([r"OST_.*Topo.*"]))
}

fn modeling() -> NodeDef {
    NodeDef::new("Modeling")
        .include([r"OST_Generic.*"])
        .exclude(["OST_GenericLines"])
        .child(NodeDef::new("Mass").include([r"OST_Mass.*"]).exclude([
            r"OST_.+Cutter",
            r"OST_.+Splitter",
            r"OST_.+All",
            r"OST_.+Outlines",
        ]))
        .child(NodeDef::new("Ceilings").include([r"OST_Ceiling.*"]).exclude([
            r"OST_.+Cut.*",
            r"OST_.+Projection.*",
            r"OST_.+Default.*",
        ]))
        .child(
            NodeDef::new("Columns").include([r"OST_Column.*"]).exclude([r"OST_.+LocalCoordSys"]),
        )
        .child(NodeDef::new("Curtain Systems").include([r"OST_Curta.*"]).exclude([
            r"OST_.+FaceManager.*",
            r"OST_CurtainGrids.+",
            r"OST_Curtain.+Cut",
        ]))
        .child(NodeDef::new("Floors").include([r"OST_Floor.*"]).exclude([
            r"OST_.+LocalCoordSys",
            r"OST_.+Cut.*",
            r"OST_.+Projection.*",
            r"OST_.+Default.*",
        ]))
        .child(NodeDef::new("Doors").include([r"OST_Door.*"]).exclude(CUT_STYLES.iter().copied()))
        .child(NodeDef::new("Casework").include([r"OST_Casework.*"]))
        .child(
            NodeDef::new("Windows").include([r"OST_Window.*"]).exclude(CUT_STYLES.iter().copied()),
        )
        .child(NodeDef::new("Furniture").include([r"OST_Furniture.*"]))
        .child(NodeDef::new("Adaptive").include([r"OST_Adaptive.*"]))
        .child(NodeDef::new("Speciality").include([r"OST_Speciality.*"]))
        .child(
            NodeDef::new("Openings")
                .exclusive(OPENING_MARKS.iter().copied())
                .exclude(CUT_STYLES.iter().copied())
                .exclude(earlier_claims(&[])),
        )
        .child(
            NodeDef::new("Railing").include([r"OST_Railing.*"]).exclude(CUT_STYLES.iter().copied()),
        )
        .child(
            NodeDef::new("Stairs")
                .include([r"OST_Stair.*", r"OST_.+Stairs"])
                .exclude(CUT_STYLES.iter().copied()),
        )
        .child(NodeDef::new("Ramps").include([r"OST_Ramp.*"]).exclude(CUT_STYLES.iter().copied()))
        .child(
            NodeDef::new("Walls")
                .include([r"OST_Wall.*", r"OST_Reveals", r"OST_Stacked.*"])
                .exclude([r"OST_.+LocalCoordSys", r"OST_.+RefPlanes", r"OST_.+Default"])
                .exclude(CUT_STYLES.iter().copied()),
        )
        .child(
            NodeDef::new("Roofs")
                .include([
                    r"OST_Roof.*",
                    r"OST_Fascia.*",
                    r"OST_Purlin.*",
                    r"OST_Gutter.*",
                    r"OST_Cornices.*",
                    r"OST_Dormer.*",
                ])
                .exclude([r"OST_.+Opening.*"])
                .exclude(CUT_STYLES.iter().copied()),
        )
        .child(
            NodeDef::new("Spatial")
                .include([
                    r"OST_Area.*",
                    r"OST_Zone.*",
                    r"OST_MEPSpace.*",
                    r"OST_Zoning.*",
                    r"OST_Room.*",
                ])
                .exclude([
                    r"OST_.+Fill",
                    r"OST_.+Visibility",
                    r"OST_AreaRein.*",
                    r"OST_AreaReport.*",
                ]),
        )
        .child(structural())
        .child(
            NodeDef::new("Mechanical")
                .include([
                    r"OST_Mechanical.*",
                    r"OST_.+Ducts",
                    r"OST_Duct.*",
                    r"OST_MEPAnalytical.*",
                    r"OST_Flex.*",
                    r"OST_MEPSystem.*",
                    r"OST_HVAC.*",
                    r"OST_Fabrication.+",
                ])
                .exclude([r"OST_.+Reference.*", r"OST_.+TmpGraphic.*", r"OST_.+Visibility"]),
        )
        .child(
            NodeDef::new("Electrical")
                .include([
                    r"OST_.+Pipes",
                    r"OST_Conduit.*",
                    r"OST_Cable.*",
                    r"OST_Wire.*",
                    r"OST_Light.*",
                    r"OST_Device.*",
                    r"OST_Panel.*",
                    r"OST_Elec.*",
                    r"OST_Routing.*",
                    r"OST_Switch.*",
                    r"OST_Connector.*",
                    r"OST_Route.*",
                    r"OST_.+Devices|OST_.+Device(Tags)|OST_.+Templates?",
                ])
                .exclude([
                    r"OST_.+Axis",
                    r"OST_.+Template.*",
                    r"OST_.+Definition.*",
                    r"OST_.+Material",
                ]),
        )
        .child(
            NodeDef::new("Plumbing")
                .include([
                    r"OST_Pipe.*",
                    r"OST_Fluid.*",
                    r"OST_Fixture.*",
                    r"OST_PlumbingFixture.*",
                    r"OST_Piping.*",
                    r"OST_Sprinkler.*",
                ])
                .exclude([r"OST_.+Reference.*", r"OST_.+Material"]),
        )
}

fn structural() -> NodeDef {
    NodeDef::new("Structural")
        .include([
            r"OST_Struct.+",
            r"OST_.+Bracing",
            r"OST_Truss.*",
            r"OST_Joist.*",
            r"OST_FabricArea.*",
            r"OST_Rebar.*",
            r"OST_Girder.*",
            r"OST_Edge.*",
            r"OST_Load.*",
            r"OST_Internal.*Load.*",
            r"OST_Isolated.*",
            r"OST_Framing.*",
            r"OST_Footing.*",
            r"OST_Foundation.*",
            r"OST_Fnd.*",
            r"OST_Span.*",
            r"OST_Steel.*",
            r"OST_SWall.*",
            r"OST_Brace.*",
            r"OST_Bridge.*",
            r"OST_.*PointLoad.*",
            r"OST_Beam.*",
        ])
        .exclude([
            r"OST_.+LocalCoordSys",
            r"OST_.+Other",
            r"OST_.+LocationLine",
            r"OST_.+PlanReps",
            r"OST_.+NobleWarning",
            r"OST_.+Failed",
        ])
}

fn drafting() -> NodeDef {
    NodeDef::new("Drafting")
        .child(
            NodeDef::new("Views")
                .include([
                    r"OST_.*Annotation.*",
                    "OST_Views",
                    "OST_PlanRegion",
                    r"OST_Schedule.*",
                    r"OST_Camera.*",
                    r"OST_Crop.*",
                    r"OST_Compass.*",
                    r"OST_Section.*",
                    r"OST_Sun.*",
                    r"OST_RenderRegions",
                ])
                .exclude([r"OST_.+ViewParamGroup"]),
        )
        .child(NodeDef::new("Sheets").include([
            r"OST_Sheet.*",
            r"OST_Viewport.*",
            r"OST_Title.*",
            r"OST_Guide.*",
            r"OST_Revisions.*",
        ]))
        .child(
            NodeDef::new("Tags")
                .exclusive(TAG_MARKS.iter().copied())
                .exclude(earlier_claims(&[OPENING_MARKS])),
        )
        .child(
            NodeDef::new("Annotation")
                .exclusive(ANNOTATION_MARKS.iter().copied())
                .exclude([r"OST_DimLock.+", r"OST_IOS.+", r"OST_.+Symbology"])
                .exclude(earlier_claims(&[OPENING_MARKS, TAG_MARKS])),
        )
}

fn analysis() -> NodeDef {
    NodeDef::new("Analysis")
        .exclusive(ANALYSIS_MARKS.iter().copied())
        .exclude([r"OST_AnalysisResults"])
        .exclude(earlier_claims(&[OPENING_MARKS, TAG_MARKS, ANNOTATION_MARKS, LINK_MARKS]))
        .child(
            NodeDef::new("Paths").exclusive(PATH_MARKS.iter().copied()).exclude(earlier_claims(&[
                OPENING_MARKS,
                TAG_MARKS,
                ANNOTATION_MARKS,
                LINK_MARKS,
                ANALYSIS_MARKS,
            ])),
        )
}

fn rendering() -> NodeDef {
    NodeDef::new("Rendering").include([r"OST_Entourage.*"]).child(
        NodeDef::new("Materials")
            .exclusive([
                r"OST_Material.*",
                r"OST_Appearance.*",
                r"OST_Decal.*",
                r"OST_Planting.*",
            ])
            .exclude(earlier_claims(&[
                OPENING_MARKS,
                TAG_MARKS,
                ANNOTATION_MARKS,
                LINK_MARKS,
                ANALYSIS_MARKS,
                PATH_MARKS,
            ])),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::ClassificationEngine;

    #[test]
    fn test_revit_table_compiles() {
        let taxonomy = revit_categories().unwrap();
        let top: Vec<&str> =
            taxonomy.roots().iter().map(|&id| taxonomy.node(id).name()).collect();

        assert_eq!(
            top,
            vec![
                "Skip",
                "Site",
                "References",
                "Modeling",
                "Drafting",
                "Containers",
                "Links",
                "Analysis",
                "Rendering"
            ]
        );
        assert!(taxonomy.node(taxonomy.find("Skip").unwrap()).is_hidden());
        assert_eq!(taxonomy.path(taxonomy.find("Paths").unwrap()), vec!["Analysis", "Paths"]);
    }

    #[test]
    fn test_lookup_by_name() {
        assert!(builtin(REVIT_CATEGORIES).is_ok());

        let err = builtin("unknown").unwrap_err();
        assert!(matches!(err, TaxonError::UnknownTaxonomy { .. }));
        assert!(err.to_string().contains(REVIT_CATEGORIES));
    }

    #[test]
    fn test_later_exclusive_groups_veto_earlier_claims() {
        let taxonomy = revit_categories().unwrap();
        let annotation = taxonomy.node(taxonomy.find("Annotation").unwrap());

        assert!(annotation.exclusives().is_match("OST_DoorTags"));
        assert!(annotation.excludes().is_match("OST_DoorTags"));
        assert!(annotation.excludes().is_match("OST_WallsObsolete"));
        assert!(!annotation.excludes().is_match("OST_Dimensions"));
    }

    /// Owners of a broad sample of Revit codes, as path from the top-level group
    const OWNERS: &[(&str, Option<&str>)] = &[
        ("OST_DSR_Arrows", Some("Skip")),
        ("OST_WallsObsolete", Some("Skip")),
        ("OST_gbXMLSurfaces", Some("Skip")),
        ("OST_SiteProperty", Some("Site")),
        ("OST_Topography", Some("Site/Topography")),
        ("OST_Grids", Some("References")),
        ("OST_Levels", Some("References")),
        ("OST_GenericModel", Some("Modeling")),
        ("OST_Mass", Some("Modeling/Mass")),
        ("OST_Ceilings", Some("Modeling/Ceilings")),
        ("OST_CurtainWallMullions", Some("Modeling/Curtain Systems")),
        ("OST_CurtainWallPanels", Some("Modeling/Curtain Systems")),
        ("OST_Floors", Some("Modeling/Floors")),
        ("OST_Doors", Some("Modeling/Doors")),
        ("OST_Casework", Some("Modeling/Casework")),
        ("OST_Windows", Some("Modeling/Windows")),
        ("OST_Furniture", Some("Modeling/Furniture")),
        ("OST_AnalyticalOpening", Some("Modeling/Openings")),
        ("OST_ArcWallRectOpening", Some("Modeling/Openings")),
        ("OST_FloorOpening", Some("Modeling/Openings")),
        ("OST_RoofOpening", Some("Modeling/Openings")),
        ("OST_SWallRectOpening", Some("Modeling/Openings")),
        ("OST_ShaftOpening", Some("Modeling/Openings")),
        ("OST_ShaftOpeningHiddenLines", Some("Modeling/Openings")),
        ("OST_StructuralFramingOpening", Some("Modeling/Openings")),
        ("OST_WallOpeningTags", Some("Modeling/Openings")),
        ("OST_Stairs", Some("Modeling/Stairs")),
        ("OST_StairsRailing", Some("Modeling/Stairs")),
        ("OST_Ramps", Some("Modeling/Ramps")),
        ("OST_Walls", Some("Modeling/Walls")),
        ("OST_Roofs", Some("Modeling/Roofs")),
        ("OST_Areas", Some("Modeling/Spatial")),
        ("OST_Rooms", Some("Modeling/Spatial")),
        ("OST_StructuralColumns", Some("Modeling/Structural")),
        ("OST_StructuralFraming", Some("Modeling/Structural")),
        ("OST_DuctCurves", Some("Modeling/Mechanical")),
        ("OST_FlexDuctCurves", Some("Modeling/Mechanical")),
        ("OST_FlexPipeCurves", Some("Modeling/Mechanical")),
        ("OST_MechanicalEquipment", Some("Modeling/Mechanical")),
        ("OST_CableTray", Some("Modeling/Electrical")),
        ("OST_Conduit", Some("Modeling/Electrical")),
        ("OST_ElectricalEquipment", Some("Modeling/Electrical")),
        ("OST_LightingFixtures", Some("Modeling/Electrical")),
        ("OST_PipeCurves", Some("Modeling/Plumbing")),
        ("OST_PlumbingFixtures", Some("Modeling/Plumbing")),
        ("OST_Sprinklers", Some("Modeling/Plumbing")),
        ("OST_Cameras", Some("Drafting/Views")),
        ("OST_Schedules", Some("Drafting/Views")),
        ("OST_Sections", Some("Drafting/Views")),
        ("OST_Views", Some("Drafting/Views")),
        ("OST_Sheets", Some("Drafting/Sheets")),
        ("OST_TitleBlocks", Some("Drafting/Sheets")),
        ("OST_Viewports", Some("Drafting/Sheets")),
        ("OST_AreaTags", Some("Drafting/Tags")),
        ("OST_DoorTags", Some("Drafting/Tags")),
        ("OST_DuctTags", Some("Drafting/Tags")),
        ("OST_KeynoteTags", Some("Drafting/Tags")),
        ("OST_MaterialTags", Some("Drafting/Tags")),
        ("OST_MultiCategoryTags", Some("Drafting/Tags")),
        ("OST_PathOfTravelTags", Some("Drafting/Tags")),
        ("OST_PipeTags", Some("Drafting/Tags")),
        ("OST_RoomTags", Some("Drafting/Tags")),
        ("OST_StructuralFramingTags", Some("Drafting/Tags")),
        ("OST_WindowTags", Some("Drafting/Tags")),
        ("OST_Callouts", Some("Drafting/Annotation")),
        ("OST_DetailComponents", Some("Drafting/Annotation")),
        ("OST_Dimensions", Some("Drafting/Annotation")),
        ("OST_GenericAnnotation", Some("Drafting/Annotation")),
        ("OST_RevisionClouds", Some("Drafting/Annotation")),
        ("OST_SpotElevations", Some("Drafting/Annotation")),
        ("OST_Assemblies", Some("Containers")),
        ("OST_IOSModelGroups", Some("Containers")),
        ("OST_Parts", Some("Containers")),
        ("OST_PointClouds", Some("Links")),
        ("OST_RasterImages", Some("Links")),
        ("OST_RvtLinks", Some("Links")),
        ("OST_TopographyLink", Some("Links")),
        ("OST_AnalyticalNodes", Some("Analysis")),
        ("OST_PathOfTravelLines", Some("Analysis/Paths")),
        ("OST_Entourage", Some("Rendering")),
        ("OST_Materials", Some("Rendering/Materials")),
        ("OST_Planting", Some("Rendering/Materials")),
        ("OST_WallsCutPattern", None),
        ("OST_ReferencePoints", None),
        ("OST_GenericLines", None),
        ("OST_TextNotes", None),
        ("OST_AnalysisResults", None),
    ];

    #[test]
    fn test_broad_sample_classifies_without_conflict() {
        let taxonomy = revit_categories().unwrap();
        let classification = ClassificationEngine::new(&taxonomy)
            .classify(OWNERS.iter().map(|(code, _)| *code))
            .unwrap();

        for (code, expected) in OWNERS {
            let owner = classification.owner(code).map(|id| taxonomy.path(id).join("/"));
            assert_eq!(owner.as_deref(), *expected, "owner of {code}");
        }
    }

    #[test]
    fn test_overlapping_codes_stay_with_the_earlier_group() {
        let taxonomy = revit_categories().unwrap();
        let classification = ClassificationEngine::new(&taxonomy)
            .classify(["OST_AnalyticalOpening", "OST_WallOpeningTags", "OST_Walls"])
            .unwrap();

        assert_eq!(classification.owner_name("OST_AnalyticalOpening"), Some("Openings"));
        assert_eq!(classification.owner_name("OST_WallOpeningTags"), Some("Openings"));
        assert_eq!(classification.owner_name("OST_Walls"), Some("Walls"));
    }
}
