pub mod arcgis;
