//! Three-step bulk product import: upload images, parse and validate
//! the CSV against the uploaded filenames, then create products with
//! technique/season names resolved to ids. Every step isolates
//! per-item failures; only structural problems abort a call.

pub mod create_products;
pub mod csv_parse;
pub mod image_upload;

/// Downloadable CSV template: the exact recognized header plus three
/// example rows. Operators author their input from this file.
pub const CSV_TEMPLATE: &str = r#"name,modelNumber,brandName,technique,season,material,fabric,pattern,style,shape,use,closureType,colorTechnique,placeOfOrigin,description,images,sizes,features,customizationOptions,customizationAvailable,oemService,inStock,featured
"Handwoven Cotton Cushion Cover","MC-001","Malani","Block Printing","Summer","Cotton","100% Cotton","Floral","Traditional","Square","Home Decor","Zipper","Natural Dyes","Jaipur, India","Beautiful handwoven cushion cover with traditional block printing","MC-001-1.jpg,MC-001-2.jpg","12x12,16x16,18x18","Handmade,Eco-friendly,Washable","Color,Size,Design","TRUE","Available","TRUE","TRUE"
"Embroidered Silk Table Runner","MC-002","Malani","Hand Embroidery","Winter","Silk","Pure Silk","Geometric","Modern","Rectangle","Table Decor","","Hand Embroidery","Jaipur, India","Elegant silk table runner with intricate hand embroidery","MC-002-1.jpg,MC-002-2.jpg,MC-002-3.jpg","14x72,16x90","Handmade,Premium Quality","Color,Length","TRUE","Available","TRUE","FALSE"
"Cotton Throw Pillow","MC-003","Malani","Weaving","","Cotton","Cotton Blend","Plain","Casual","Square","Home","Zipper","Natural","India","Comfortable cotton throw pillow","","18x18,20x20","Soft,Durable","Color","TRUE","Available","TRUE","FALSE"
"#;
